//! S-expression dump of a [`Document`], for diagnostics and tests.
//!
//! Elements print as `(tag name="value" ... children)`, text as a quoted
//! string, and plugin and variable leaves as `(plugin "...")` and
//! `(variable "...")`.

use std::io::{self, Write};

use crate::document::Document;
use crate::nodes::{Node, NodeValue};

/// Spaces to indent nested nodes.
const INDENT: usize = 4;

/// Elements whose children start on their own lines in the indented form.
const BLOCK_TAGS: &[&str] = &[
    "domroot", "p", "pre", "ul", "ol", "li", "dl", "dt", "dd", "table", "tr", "th", "td", "div",
    "h2", "h3", "h4", "hr",
];

fn is_block(value: &NodeValue) -> bool {
    value.tag().map_or(false, |t| BLOCK_TAGS.contains(&t))
}

struct SexprFormatter<'d, W> {
    doc: &'d Document,
    output: W,
    compact: bool,
}

impl<'d, W: Write> SexprFormatter<'d, W> {
    fn format(&mut self, node: Node, indent: usize) -> io::Result<()> {
        let doc = self.doc;
        match doc.value(node) {
            NodeValue::Text(t) => write!(self.output, "{:?}", t),
            NodeValue::Plugin(p) => write!(self.output, "(plugin {:?})", p.invocation),
            NodeValue::Variable(v) => write!(self.output, "(variable {:?})", v.reference),
            NodeValue::Element(el) => {
                write!(self.output, "({}", el.tag)?;
                for (name, value) in &el.attributes {
                    write!(self.output, " {}={:?}", name, value)?;
                }

                let has_blocks =
                    !self.compact && node.children(doc.arena()).any(|c| is_block(doc.value(c)));
                for child in node.children(doc.arena()) {
                    if has_blocks {
                        write!(self.output, "\n{:1$}", "", indent + INDENT)?;
                    } else {
                        write!(self.output, " ")?;
                    }
                    self.format(child, indent + INDENT)?;
                }
                write!(self.output, ")")
            }
        }
    }
}

/// Write `doc` as an indented S-expression, one block per line.
pub fn format_document<W: Write>(doc: &Document, output: &mut W) -> io::Result<()> {
    let mut f = SexprFormatter {
        doc,
        output: &mut *output,
        compact: false,
    };
    f.format(doc.root(), 0)?;
    writeln!(output)
}

/// Write the subtree at `node` on a single line.
pub fn format_node_compact<W: Write>(doc: &Document, node: Node, output: &mut W) -> io::Result<()> {
    SexprFormatter {
        doc,
        output,
        compact: true,
    }
    .format(node, 0)
}

/// The whole of `doc` on a single line.
///
/// ```
/// # use wikitree::{parse_document, sexpr, Adapters, Options};
/// let doc = parse_document("Main", "''hi''", &Options::default(), &Adapters::default()).unwrap();
/// assert_eq!(sexpr::to_compact_string(&doc), r#"(domroot (i "hi"))"#);
/// ```
pub fn to_compact_string(doc: &Document) -> String {
    let mut out = Vec::new();
    format_node_compact(doc, doc.root(), &mut out).ok();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use crate::{parse_document, Adapters, Options};

    #[test]
    fn indents_blocks() {
        let doc = parse_document(
            "Main",
            "* one\n* __two__\n",
            &Options::default(),
            &Adapters::default(),
        )
        .unwrap();
        let mut out = vec![];
        super::format_document(&doc, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            concat!(
                "(domroot\n",
                "    (ul\n",
                "        (li \"one\\n\")\n",
                "        (li (b \"two\") \"\\n\")))\n",
            )
        );
    }

    #[test]
    fn compact_form_is_one_line() {
        let doc = parse_document(
            "Main",
            "* one\n* [{$pagename}]",
            &Options::default(),
            &Adapters::default(),
        )
        .unwrap();
        assert_eq!(
            super::to_compact_string(&doc),
            r#"(domroot (ul (li "one\n") (li (variable "{$pagename}"))))"#
        );
    }
}
