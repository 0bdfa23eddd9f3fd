//! The document tree.

use indexmap::IndexMap;

use crate::adapters::LazyContent;
use crate::arena_tree;

/// The arena every node of a [`Document`](crate::Document) lives in.
pub type Arena = arena_tree::Arena<Ast>;

/// A handle to a node in the document [`Arena`].
pub type Node = arena_tree::Id<Ast>;

/// Tags that stay childless when closed.  Every other element closed with no
/// children receives an empty text child so serialisers keep the open/close
/// pair.
pub const AUTO_VOID_TAGS: &[&str] = &["img", "br", "hr"];

/// The core node enum.
#[derive(Debug, Clone)]
pub enum NodeValue {
    /// An element with a tag name, ordered attributes and children.  The
    /// document root is an element named `domroot`.
    Element(NodeElement),

    /// Literal text.  The content is markup-safe: unless raw HTML is allowed,
    /// HTML-sensitive characters have already been entity-escaped.
    Text(String),

    /// A plugin invocation, evaluated by the renderer rather than the parser.
    Plugin(NodePlugin),

    /// A variable reference such as `{$pagename}`, expanded at render time.
    Variable(NodeVariable),
}

/// An element's name and attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeElement {
    /// The tag name, e.g. `p` or `a`.
    pub tag: String,

    /// Attributes in insertion order.
    pub attributes: IndexMap<String, String>,
}

/// A deferred plugin invocation.
#[derive(Debug, Clone)]
pub struct NodePlugin {
    /// The bracket contents, braces included: `{TableOfContents}`.
    pub invocation: String,

    /// The executor's deferred output.
    pub content: LazyContent,
}

/// A deferred variable reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeVariable {
    /// The bracket contents, braces included: `{$pagename}`.
    pub reference: String,
}

/// The payload stored in each arena node.
#[derive(Debug, Clone)]
pub struct Ast {
    /// The node itself.
    pub value: NodeValue,

    /// The 1-based source line the node was opened on.
    pub line: usize,
}

impl Ast {
    /// A payload starting on `line`.
    pub fn new(value: NodeValue, line: usize) -> Self {
        Ast { value, line }
    }
}

impl NodeElement {
    /// An element with no attributes.
    pub fn new(tag: &str) -> Self {
        NodeElement {
            tag: tag.to_string(),
            attributes: IndexMap::new(),
        }
    }

    /// Builder-style attribute setter; replaces an existing value.
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Look up an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl From<NodeElement> for NodeValue {
    fn from(el: NodeElement) -> Self {
        NodeValue::Element(el)
    }
}

impl NodeValue {
    /// Shorthand for an attribute-less element.
    pub fn element(tag: &str) -> Self {
        NodeValue::Element(NodeElement::new(tag))
    }

    /// The tag name, if this is an element.
    pub fn tag(&self) -> Option<&str> {
        match self {
            NodeValue::Element(el) => Some(&el.tag),
            _ => None,
        }
    }

    /// Whether this is an element named `tag`.
    pub fn is_element(&self, tag: &str) -> bool {
        self.tag() == Some(tag)
    }

    /// The element data, if this is an element.
    pub fn as_element(&self) -> Option<&NodeElement> {
        match self {
            NodeValue::Element(el) => Some(el),
            _ => None,
        }
    }

    /// The text content, if this is a text node.
    pub fn text(&self) -> Option<&str> {
        match self {
            NodeValue::Text(t) => Some(t),
            _ => None,
        }
    }

    /// A short name for the kind of node, used by the diagnostic dump.
    pub fn kind_name(&self) -> &str {
        match self {
            NodeValue::Element(el) => &el.tag,
            NodeValue::Text(..) => "text",
            NodeValue::Plugin(..) => "plugin",
            NodeValue::Variable(..) => "variable",
        }
    }

    /// Whether closing this node without children leaves it childless.
    pub fn is_auto_void(&self) -> bool {
        self.tag().map_or(true, |t| AUTO_VOID_TAGS.contains(&t))
    }
}

/// Concatenated text of every text node at or below `node`.
pub fn text_content(arena: &Arena, node: Node) -> String {
    let mut out = String::new();
    for n in node.descendants(arena) {
        if let NodeValue::Text(t) = &n.data(arena).value {
            out.push_str(t);
        }
    }
    out
}
