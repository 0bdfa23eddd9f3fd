mod anchor;
mod autolink;
mod inlines;
mod links;
mod lists;
pub mod options;
mod source;
mod table;

use std::io::{BufRead, Cursor};

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::adapters::Adapters;
use crate::arena_tree;
use crate::document::{Document, Heading, HeadingLevel};
use crate::error::ParseError;
use crate::nodes::{Arena, Ast, Node, NodeElement, NodeValue};
use crate::parser::anchor::SectionCounter;
use crate::parser::options::Hooks;
pub use crate::parser::options::Options;
use crate::parser::source::Source;

pub use crate::parser::lists::{reconcile, substitute_phpwiki, ListKind, ListOp};

/// Lines starting with one of these never open a paragraph.
const NO_PARAGRAPH_PREFIXES: &[&str] = &["{{{", "----", "%%", "*", "#", "!", ";"];

/// Parse wiki markup for the page `page` into a [`Document`].
///
/// ```
/// # use wikitree::{parse_document, Adapters, Options};
/// let doc = parse_document("Main", "Hello __world__", &Options::default(), &Adapters::default())
///     .unwrap();
/// assert_eq!(doc.text_content(), "Hello world");
/// assert_eq!(doc.elements("b").len(), 1);
/// ```
pub fn parse_document(
    page: &str,
    text: &str,
    options: &Options,
    adapters: &Adapters,
) -> Result<Document, ParseError> {
    parse_reader(page, Cursor::new(text.as_bytes()), options, adapters)
}

/// Parse wiki markup read from `reader`.  Read failures, including invalid
/// UTF-8, abort the parse.
pub fn parse_reader<R: BufRead>(
    page: &str,
    reader: R,
    options: &Options,
    adapters: &Adapters,
) -> Result<Document, ParseError> {
    Parser::new(page, reader, options, *adapters).parse()
}

/// What a markup handler did with its trigger character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Markup was recognised; the line is no longer at its start.
    Markup,
    /// Nothing recognised; the trigger is ordinary text.
    Literal,
    /// Consumed without leaving the start of a line.
    Skip,
}

/// Where an escaping region was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Escape {
    /// `{{{` at line start, in a `pre`.
    Block,
    /// `{{{` mid-line, in a `span class="inline-code"`.
    Inline,
}

/// Formatting and line state, threaded through the handlers.
#[derive(Debug, Clone)]
pub(crate) struct InlineState {
    pub bold: bool,
    pub italic: bool,
    /// Bold or italic crossed a block boundary and resumes in the next
    /// paragraph.
    pub restart_bold: bool,
    pub restart_italic: bool,
    pub escaping: Option<Escape>,
    pub new_line: bool,
    pub definition: bool,
    pub open_paragraph: bool,
}

impl Default for InlineState {
    fn default() -> Self {
        InlineState {
            bold: false,
            italic: false,
            restart_bold: false,
            restart_italic: false,
            escaping: None,
            new_line: true,
            definition: false,
            open_paragraph: false,
        }
    }
}

/// A `%%` block on the style stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StyleBlock {
    Span,
    Div,
}

impl StyleBlock {
    fn tag(self) -> &'static str {
        match self {
            StyleBlock::Span => "span",
            StyleBlock::Div => "div",
        }
    }
}

/// A single-use parser.  [`Parser::parse`] consumes it, so every document
/// gets fresh state.
pub struct Parser<'o, 'c, 'p, R> {
    arena: Arena,
    root: Node,
    current: Node,
    source: Source<R>,
    options: &'o Options<'c>,
    adapters: Adapters<'p>,
    page: String,
    inline: InlineState,
    lists: String,
    table_row: Option<usize>,
    styles: SmallVec<[StyleBlock; 8]>,
    last_heading: Option<String>,
    text: String,
    image_patterns: Vec<glob::Pattern>,
    sections: SectionCounter,
    metadata: IndexMap<String, String>,
    clean: bool,
    clean_options: Option<Options<'c>>,
}

impl<'o, 'c, 'p, R> Parser<'o, 'c, 'p, R>
where
    'c: 'o,
    R: BufRead,
{
    /// A parser reading `reader` for the page `page`.
    pub fn new(page: &str, reader: R, options: &'o Options<'c>, adapters: Adapters<'p>) -> Self {
        let mut arena = Arena::new();
        let root = arena_tree::alloc(&mut arena, Ast::new(NodeValue::element("domroot"), 1));
        Parser {
            arena,
            root,
            current: root,
            source: Source::new(reader, options.parse.pushback_limit),
            options,
            adapters,
            page: page.to_string(),
            inline: InlineState::default(),
            lists: String::new(),
            table_row: None,
            styles: SmallVec::new(),
            last_heading: None,
            text: String::new(),
            image_patterns: options::compile_image_patterns(&options.extension.inline_image_patterns),
            sections: SectionCounter::default(),
            metadata: IndexMap::new(),
            clean: false,
            clean_options: None,
        }
    }

    /// Run the driver loop to the end of input.
    pub fn parse(mut self) -> Result<Document, ParseError> {
        log::trace!("parsing {:?} (clean: {})", self.page, self.clean);

        while let Some(c) = self.source.next()? {
            if self.inline.escaping.is_some() {
                self.escaped_char(c)?;
                continue;
            }
            if c == '\r' {
                continue;
            }

            if self.inline.new_line && !matches!(c, '*' | '#' | ' ') && !self.lists.is_empty() {
                self.unwind_lists()?;
            }
            if self.inline.new_line && c != '|' && self.table_row.is_some() {
                self.pop("table")?;
                self.table_row = None;
            }

            let new_line = self.inline.new_line;
            let outcome = match c {
                '\n' => self.handle_newline()?,
                '\\' => self.handle_backslash()?,
                '_' => self.handle_underscore()?,
                '\'' => self.handle_apostrophe()?,
                '{' => self.handle_open_brace(new_line)?,
                '}' => self.handle_close_brace()?,
                '-' if new_line => self.handle_dash()?,
                '!' if new_line => self.handle_heading()?,
                ';' if new_line => self.handle_definition()?,
                ':' if self.inline.definition => {
                    self.pop("dt")?;
                    self.push(NodeValue::element("dd"))?;
                    self.inline.definition = false;
                    Outcome::Markup
                }
                '[' => self.handle_open_bracket()?,
                '*' | '#' if new_line => {
                    self.source.push_back(c)?;
                    self.handle_list()?
                }
                '|' => self.handle_bar(new_line)?,
                '~' => self.handle_tilde()?,
                '%' => self.handle_style()?,
                _ => Outcome::Literal,
            };

            match outcome {
                Outcome::Markup => self.inline.new_line = false,
                Outcome::Literal => {
                    self.text.push(c);
                    self.inline.new_line = false;
                }
                Outcome::Skip => {}
            }
        }

        self.close_headings()?;
        self.flush_text()?;
        while self.current != self.root {
            self.close_current()?;
        }

        let source = self.source.into_transcript();
        log::trace!("parsed {:?} ({} bytes)", self.page, source.len());
        Ok(Document {
            arena: self.arena,
            root: self.root,
            page: self.page,
            source,
            metadata: self.metadata,
        })
    }

    /// A character inside `{{{ ... }}}`: everything is literal and escaped,
    /// except the closing braces.
    fn escaped_char(&mut self, c: char) -> Result<(), ParseError> {
        match c {
            '}' => {
                if self.handle_close_brace()? == Outcome::Literal {
                    self.text.push('}');
                }
            }
            '\r' => {}
            '<' => self.text.push_str("&lt;"),
            '>' => self.text.push_str("&gt;"),
            '&' => self.text.push_str("&amp;"),
            '~' => {
                let braces = self.source.read_while("}")?;
                let rest = if braces.len() >= 3 {
                    self.text.push_str("}}}");
                    &braces[3..]
                } else {
                    self.text.push('~');
                    &braces[..]
                };
                self.source.push_back_str(rest)?;
            }
            c => self.text.push(c),
        }
        Ok(())
    }

    fn handle_newline(&mut self) -> Result<Outcome, ParseError> {
        self.close_headings()?;
        self.pop("dl")?;
        if self.table_row.is_some() {
            self.pop("tr")?;
        }
        self.inline.definition = false;

        if !self.inline.new_line {
            self.text.push('\n');
            self.inline.new_line = true;
            return Ok(Outcome::Skip);
        }

        self.start_block_level()?;
        let next = self.source.peek_line()?;
        if next.is_empty() || !NO_PARAGRAPH_PREFIXES.iter().any(|p| next.starts_with(p)) {
            self.push(NodeValue::element("p"))?;
            self.inline.open_paragraph = true;

            if self.inline.restart_italic {
                self.push(NodeValue::element("i"))?;
                self.inline.italic = true;
                self.inline.restart_italic = false;
            }
            if self.inline.restart_bold {
                self.push(NodeValue::element("b"))?;
                self.inline.bold = true;
                self.inline.restart_bold = false;
            }
        }
        Ok(Outcome::Skip)
    }

    /// Close inline formatting and any open paragraph before a block-level
    /// construct.  Bold and italic are remembered so the next paragraph can
    /// resume them.
    pub(crate) fn start_block_level(&mut self) -> Result<(), ParseError> {
        self.pop("i")?;
        self.pop("b")?;
        self.pop("tt")?;

        if self.inline.open_paragraph {
            self.inline.open_paragraph = false;
            self.pop("p")?;
            self.text.push('\n');
        }

        self.inline.restart_italic = self.inline.italic;
        self.inline.restart_bold = self.inline.bold;
        self.inline.italic = false;
        self.inline.bold = false;
        Ok(())
    }

    /// End the heading on this line, if any, with its hash link.
    fn close_headings(&mut self) -> Result<(), ParseError> {
        if let Some(anchor) = self.last_heading.take() {
            let link = self.add(
                NodeElement::new("a")
                    .with("class", "hashlink")
                    .with("href", format!("#{}", anchor))
                    .into(),
            )?;
            self.attach(link, NodeValue::Text("#".to_string()))?;
        }
        for tag in ["h2", "h3", "h4"] {
            self.pop(tag)?;
        }
        Ok(())
    }

    /// `!`, `!!` or `!!!` at line start.  The title stays in the stream and
    /// is parsed as the heading's content.
    fn handle_heading(&mut self) -> Result<Outcome, ParseError> {
        let level = match self.source.next()? {
            Some('!') => match self.source.next()? {
                Some('!') => HeadingLevel::Large,
                other => {
                    self.source.unread(other)?;
                    HeadingLevel::Medium
                }
            },
            other => {
                self.source.unread(other)?;
                HeadingLevel::Small
            }
        };

        let title = self.source.peek_line()?;
        self.start_block_level()?;

        let title_text = if self.clean {
            title.trim().to_string()
        } else {
            self.clean_text(&title)?
        };
        let section_id = self.sections.section_id(&title_text);
        let heading = Heading {
            level,
            anchor: anchor::heading_anchor(&self.page, &section_id),
            title_text,
            section_id,
        };

        if !self.clean {
            for listener in &self.options.hooks.heading_listeners {
                listener.heading(&heading);
            }
            self.last_heading = Some(heading.anchor.clone());
        }

        self.push(
            NodeElement::new(level.tag())
                .with("id", heading.anchor)
                .into(),
        )?;
        Ok(Outcome::Markup)
    }

    /// The text of `title` with all markup removed, obtained by running a
    /// second parser over it.  That parser is built in clean mode, which
    /// never builds a parser of its own.
    fn clean_text(&mut self, title: &str) -> Result<String, ParseError> {
        let base = self.options;
        let options = self.clean_options.get_or_insert_with(|| Options {
            extension: base.extension.clone(),
            parse: options::Parse {
                allow_raw_html: true,
                ..base.parse
            },
            hooks: Hooks::default(),
        });

        let mut parser = Parser::new(
            &self.page,
            Cursor::new(title.trim().as_bytes()),
            options,
            self.adapters,
        );
        parser.clean = true;
        let doc = parser.parse()?;
        Ok(doc.text_content().trim().to_string())
    }

    /// Allocate a node for `value` and append it to `parent`.
    fn attach(&mut self, parent: Node, value: NodeValue) -> Result<Node, ParseError> {
        let line = self.source.line();
        let node = arena_tree::alloc(&mut self.arena, Ast::new(value, line));
        parent
            .append(&self.arena, node)
            .map_err(|reason| ParseError::Attach {
                tag: node.data(&self.arena).value.kind_name().to_string(),
                reason,
            })?;
        Ok(node)
    }

    /// Append text to the current node, merging with a trailing text node.
    fn append_text(&mut self, text: &str) -> Result<(), ParseError> {
        if text.is_empty() {
            return Ok(());
        }
        if let Some(last) = self.current.last_child(&self.arena) {
            if let NodeValue::Text(existing) = &mut last.data_mut(&mut self.arena).value {
                existing.push_str(text);
                return Ok(());
            }
        }
        self.attach(self.current, NodeValue::Text(text.to_string()))?;
        Ok(())
    }

    /// Open `value` as a child of the current node and descend into it.
    pub(crate) fn push(&mut self, value: NodeValue) -> Result<Node, ParseError> {
        self.flush_text()?;
        let node = self.attach(self.current, value)?;
        self.current = node;
        Ok(node)
    }

    /// Close the nearest open element named `tag`, and everything inside it.
    /// Closing a tag that is not open does nothing.
    pub(crate) fn pop(&mut self, tag: &str) -> Result<Option<Node>, ParseError> {
        self.flush_text()?;

        let found = self
            .current
            .ancestors(&self.arena)
            .take_while(|n| *n != self.root)
            .find(|n| n.data(&self.arena).value.is_element(tag));

        match found {
            Some(node) => {
                while self.current != node {
                    self.close_current()?;
                }
                self.close_current()?;
                Ok(Some(node))
            }
            None => Ok(None),
        }
    }

    /// Ascend out of the current node.  An element left empty that is not
    /// void gets an empty text child.
    fn close_current(&mut self) -> Result<(), ParseError> {
        let node = self.current;
        let Some(parent) = node.parent(&self.arena) else {
            return Ok(());
        };
        if node.is_leaf(&self.arena) && !node.data(&self.arena).value.is_auto_void() {
            self.attach(node, NodeValue::Text(String::new()))?;
        }
        self.current = parent;
        Ok(())
    }

    /// Append `value` to the current node without descending.
    pub(crate) fn add(&mut self, value: NodeValue) -> Result<Node, ParseError> {
        self.flush_text()?;
        self.attach(self.current, value)
    }

    /// Add a visible error message to the tree.
    pub(crate) fn add_error(&mut self, message: &str) -> Result<(), ParseError> {
        let span = self.add(NodeElement::new("span").with("class", "error").into())?;
        let text = crate::strings::escape_html(message, true);
        self.attach(span, NodeValue::Text(text))?;
        Ok(())
    }
}
