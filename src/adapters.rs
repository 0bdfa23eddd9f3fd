//! Adapter traits for the wiki the parser runs inside.
//!
//! The parser never touches page storage, attachments, ACLs or plugins
//! itself.  Each of those is reached through one narrow trait here, bundled
//! into [`Adapters`].  Every field of [`Adapters`] is optional; see the field
//! docs for what an absent adapter means.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Answers whether a page exists, and under which canonical name.
pub trait PageResolver {
    /// Returns the canonical name of `name` if such a page exists.
    fn resolve_page(&self, name: &str) -> Option<String>;
}

/// Answers whether a link names an attachment.
pub trait AttachmentResolver {
    /// Returns the canonical attachment name (`Page/file.png`) if `link`
    /// resolves to an attachment.
    fn find_attachment(&self, link: &str) -> Option<String>;
}

/// Resolves interwiki prefixes.
pub trait InterwikiResolver {
    /// Returns the URL template for `prefix`; `%s` marks where the remote
    /// page name goes.
    fn resolve_interwiki(&self, prefix: &str) -> Option<String>;
}

/// Executes `[{Plugin ...}]` invocations.
pub trait PluginExecutor {
    /// Whether the bracket contents are a plugin invocation.
    fn is_plugin_invocation(&self, text: &str) -> bool {
        is_plugin_syntax(text)
    }

    /// Prepare the invocation.  The returned content is evaluated later, by
    /// whoever renders the tree.
    fn execute(&self, invocation: &str) -> Result<LazyContent, String>;
}

/// Expands `{$variable}` references.
pub trait VariableExpander {
    /// Whether the bracket contents are a variable reference.
    fn is_variable_reference(&self, text: &str) -> bool {
        is_variable_syntax(text)
    }

    /// Expand every variable reference inside `text`.
    fn expand_variables(&self, text: &str) -> String;
}

/// Receives `[{ALLOW ...}]` and `[{DENY ...}]` rules.
pub trait AccessRuleSink {
    /// Apply a rule, braces stripped: `ALLOW view Admin`.
    fn apply_access_rule(&self, rule: &str) -> Result<(), String>;
}

/// The kind of URL a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlKind {
    /// Read a page.
    View,
    /// Create or edit a page.
    Edit,
    /// Download an attachment.
    Attach,
    /// Attachment details.
    Info,
    /// A static resource such as an icon; the name is used verbatim.
    Resource,
}

/// Builds URLs for links produced by the parser.
pub trait UrlBuilder {
    /// The URL of `name` for the given `kind`, with an optional `#fragment`.
    fn build_url(&self, kind: UrlKind, name: &str, fragment: Option<&str>) -> String;
}

const PAGE_NAME: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// The URL layout used when no [`UrlBuilder`] is supplied.
///
/// ```
/// # use wikitree::adapters::{DefaultUrlBuilder, UrlBuilder, UrlKind};
/// let urls = DefaultUrlBuilder;
/// assert_eq!(urls.build_url(UrlKind::View, "Main Page", None), "Wiki.jsp?page=Main%20Page");
/// assert_eq!(urls.build_url(UrlKind::Attach, "Main/a.png", None), "attach/Main/a.png");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultUrlBuilder;

impl UrlBuilder for DefaultUrlBuilder {
    fn build_url(&self, kind: UrlKind, name: &str, fragment: Option<&str>) -> String {
        let name = utf8_percent_encode(name, PAGE_NAME);
        let mut url = match kind {
            UrlKind::View => format!("Wiki.jsp?page={}", name),
            UrlKind::Edit => format!("Edit.jsp?page={}", name),
            UrlKind::Attach => format!("attach/{}", name),
            UrlKind::Info => format!("PageInfo.jsp?page={}", name),
            UrlKind::Resource => name.to_string(),
        };
        if let Some(fragment) = fragment {
            url.push('#');
            url.push_str(fragment);
        }
        url
    }
}

/// Output produced on demand, after parsing.
#[derive(Clone)]
pub struct LazyContent(Arc<dyn Fn() -> String + Send + Sync>);

impl LazyContent {
    /// Wrap a deferred computation.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        LazyContent(Arc::new(f))
    }

    /// Content that is already known.
    pub fn ready(s: impl Into<String>) -> Self {
        let s = s.into();
        LazyContent::new(move || s.clone())
    }

    /// Run the computation.
    pub fn evaluate(&self) -> String {
        (self.0)()
    }
}

impl Debug for LazyContent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("<LazyContent>")
    }
}

/// Syntactic plugin test: `{Name ...}` that is none of the other brace forms.
pub fn is_plugin_syntax(text: &str) -> bool {
    text.starts_with('{')
        && !is_variable_syntax(text)
        && !is_access_rule_syntax(text)
        && !is_metadata_syntax(text)
}

/// Syntactic variable test: `{$name}`.
pub fn is_variable_syntax(text: &str) -> bool {
    text.starts_with("{$")
}

/// `{ALLOW ...}` or `{DENY ...}`.
pub fn is_access_rule_syntax(text: &str) -> bool {
    text.starts_with("{ALLOW") || text.starts_with("{DENY")
}

/// `{SET name=value}`.
pub fn is_metadata_syntax(text: &str) -> bool {
    text.starts_with("{SET")
}

/// The collaborators handed to the parser.
#[derive(Default, Clone, Copy)]
pub struct Adapters<'p> {
    /// Page existence.  Without it, no page exists.
    pub pages: Option<&'p dyn PageResolver>,

    /// Attachment lookup.  Without it, no attachment exists.
    pub attachments: Option<&'p dyn AttachmentResolver>,

    /// Interwiki templates.  Without it, every prefix is unknown.
    pub interwiki: Option<&'p dyn InterwikiResolver>,

    /// Plugin execution.  Without it, every invocation fails visibly.
    pub plugins: Option<&'p dyn PluginExecutor>,

    /// Variable expansion.  Without it, text expands to itself.
    pub variables: Option<&'p dyn VariableExpander>,

    /// Access rules.  Without it, rules are accepted and dropped.
    pub acl: Option<&'p dyn AccessRuleSink>,

    /// URL construction.  Without it, [`DefaultUrlBuilder`] is used.
    pub urls: Option<&'p dyn UrlBuilder>,
}

impl<'p> Adapters<'p> {
    pub(crate) fn resolve_page(&self, name: &str) -> Option<String> {
        self.pages.and_then(|p| p.resolve_page(name))
    }

    pub(crate) fn find_attachment(&self, link: &str) -> Option<String> {
        self.attachments.and_then(|a| a.find_attachment(link))
    }

    pub(crate) fn resolve_interwiki(&self, prefix: &str) -> Option<String> {
        self.interwiki.and_then(|i| i.resolve_interwiki(prefix))
    }

    pub(crate) fn is_plugin_invocation(&self, text: &str) -> bool {
        match self.plugins {
            Some(p) => p.is_plugin_invocation(text),
            None => is_plugin_syntax(text),
        }
    }

    pub(crate) fn execute_plugin(&self, invocation: &str) -> Result<LazyContent, String> {
        match self.plugins {
            Some(p) => p.execute(invocation),
            None => Err("no plugin executor configured".to_string()),
        }
    }

    pub(crate) fn is_variable_reference(&self, text: &str) -> bool {
        match self.variables {
            Some(v) => v.is_variable_reference(text),
            None => is_variable_syntax(text),
        }
    }

    pub(crate) fn expand_variables(&self, text: &str) -> String {
        match self.variables {
            Some(v) => v.expand_variables(text),
            None => text.to_string(),
        }
    }

    pub(crate) fn apply_access_rule(&self, rule: &str) -> Result<(), String> {
        match self.acl {
            Some(acl) => acl.apply_access_rule(rule),
            None => Ok(()),
        }
    }

    pub(crate) fn url(&self, kind: UrlKind, name: &str, fragment: Option<&str>) -> String {
        match self.urls {
            Some(u) => u.build_url(kind, name, fragment),
            None => DefaultUrlBuilder.build_url(kind, name, fragment),
        }
    }
}

impl Debug for Adapters<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapters")
            .field("pages", &self.pages.map(|_| "impl PageResolver"))
            .field("attachments", &self.attachments.map(|_| "impl AttachmentResolver"))
            .field("interwiki", &self.interwiki.map(|_| "impl InterwikiResolver"))
            .field("plugins", &self.plugins.map(|_| "impl PluginExecutor"))
            .field("variables", &self.variables.map(|_| "impl VariableExpander"))
            .field("acl", &self.acl.map(|_| "impl AccessRuleSink"))
            .field("urls", &self.urls.map(|_| "impl UrlBuilder"))
            .finish()
    }
}
