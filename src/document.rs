//! Parse results: the [`Document`] tree and the [`Heading`] side channel.

use indexmap::IndexMap;

use crate::nodes::{self, Arena, Node, NodeValue};

/// A parsed page.  Immutable once returned by the parser.
#[derive(Debug)]
pub struct Document {
    pub(crate) arena: Arena,
    pub(crate) root: Node,
    pub(crate) page: String,
    pub(crate) source: String,
    pub(crate) metadata: IndexMap<String, String>,
}

impl Document {
    /// The `domroot` element.
    pub fn root(&self) -> Node {
        self.root
    }

    /// The arena holding every node; pass it to the [`Node`] accessors.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// The name of the page this document was parsed for.
    pub fn page_name(&self) -> &str {
        &self.page
    }

    /// The markup the document was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Page metadata set with `[{SET name=value}]`, in order of appearance.
    pub fn metadata(&self) -> &IndexMap<String, String> {
        &self.metadata
    }

    /// The node's payload.
    pub fn value(&self, node: Node) -> &NodeValue {
        &node.data(&self.arena).value
    }

    /// Concatenated text of the whole document.
    pub fn text_content(&self) -> String {
        nodes::text_content(&self.arena, self.root)
    }

    /// Every element named `tag`, in document order.
    pub fn elements(&self, tag: &str) -> Vec<Node> {
        self.root
            .descendants(&self.arena)
            .filter(|n| self.value(*n).is_element(tag))
            .collect()
    }

    /// The `href` of every link, in document order.
    pub fn links(&self) -> Vec<&str> {
        self.elements("a")
            .into_iter()
            .filter_map(|n| self.value(n).as_element().and_then(|el| el.attr("href")))
            .collect()
    }
}

/// The three heading sizes, written `!!!`, `!!` and `!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingLevel {
    /// `!`, rendered as `h4`.
    Small,
    /// `!!`, rendered as `h3`.
    Medium,
    /// `!!!`, rendered as `h2`.
    Large,
}

impl HeadingLevel {
    /// The element name used for this level.
    pub fn tag(self) -> &'static str {
        match self {
            HeadingLevel::Small => "h4",
            HeadingLevel::Medium => "h3",
            HeadingLevel::Large => "h2",
        }
    }
}

/// A heading, reported to heading listeners as it is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// How large the heading is.
    pub level: HeadingLevel,

    /// The title with all markup removed.
    pub title_text: String,

    /// The document-unique `id` of the heading element.
    pub anchor: String,

    /// The page-local section name, used by `[Page#Section]` links.
    pub section_id: String,
}
