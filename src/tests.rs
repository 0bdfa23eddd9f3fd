use std::cell::RefCell;

use pretty_assertions::assert_eq;

use crate::adapters::{
    AccessRuleSink, AttachmentResolver, InterwikiResolver, LazyContent, PageResolver,
    PluginExecutor, VariableExpander,
};
use crate::{parse_document, sexpr, Adapters, Document, Options};

mod api;
mod blocks;
mod links;
mod plugins;

/// An in-memory wiki: a few pages, attachments and interwiki prefixes, and a
/// record of every ACL rule and plugin call it sees.
pub(crate) struct FakeWiki {
    pub pages: Vec<&'static str>,
    pub attachments: Vec<&'static str>,
    pub interwiki: Vec<(&'static str, &'static str)>,
    pub rules: RefCell<Vec<String>>,
    pub plugin_calls: RefCell<Vec<String>>,
}

impl FakeWiki {
    pub fn new() -> Self {
        FakeWiki {
            pages: vec!["FrontPage", "Main", "RecentChanges", "Sandbox"],
            attachments: vec!["Main/photo.png", "Main/report.pdf"],
            interwiki: vec![("Wiki", "http://remote/%s"), ("Here", "Wiki.jsp?page=%s")],
            rules: RefCell::new(vec![]),
            plugin_calls: RefCell::new(vec![]),
        }
    }

    pub fn adapters(&self) -> Adapters<'_> {
        Adapters {
            pages: Some(self),
            attachments: Some(self),
            interwiki: Some(self),
            plugins: Some(self),
            variables: Some(self),
            acl: Some(self),
            urls: None,
        }
    }
}

impl PageResolver for FakeWiki {
    fn resolve_page(&self, name: &str) -> Option<String> {
        self.pages
            .iter()
            .find(|p| **p == name)
            .map(|p| p.to_string())
    }
}

impl AttachmentResolver for FakeWiki {
    fn find_attachment(&self, link: &str) -> Option<String> {
        self.attachments
            .iter()
            .find(|a| **a == link || a.strip_prefix("Main/") == Some(link))
            .map(|a| a.to_string())
    }
}

impl InterwikiResolver for FakeWiki {
    fn resolve_interwiki(&self, prefix: &str) -> Option<String> {
        self.interwiki
            .iter()
            .find(|(p, _)| *p == prefix)
            .map(|(_, template)| template.to_string())
    }
}

impl PluginExecutor for FakeWiki {
    fn execute(&self, invocation: &str) -> Result<LazyContent, String> {
        self.plugin_calls.borrow_mut().push(invocation.to_string());
        if invocation.contains("Broken") {
            return Err("no such plugin Broken".to_string());
        }
        let name = invocation.trim_matches(|c| c == '{' || c == '}').to_string();
        Ok(LazyContent::new(move || format!("<div>{}</div>", name)))
    }
}

impl VariableExpander for FakeWiki {
    fn expand_variables(&self, text: &str) -> String {
        text.replace("{$pagename}", "Main")
    }
}

impl AccessRuleSink for FakeWiki {
    fn apply_access_rule(&self, rule: &str) -> Result<(), String> {
        if rule.contains("bogus") {
            return Err("unknown permission bogus".to_string());
        }
        self.rules.borrow_mut().push(rule.to_string());
        Ok(())
    }
}

/// Parse `input` as page `Main` against a fresh [`FakeWiki`].
fn parse_with(input: &str, options: &Options<'_>) -> Document {
    let wiki = FakeWiki::new();
    parse_document("Main", input, options, &wiki.adapters()).unwrap()
}

#[track_caller]
fn compare_opts(input: &str, expected: &str, options: &Options<'_>) {
    let doc = parse_with(input, options);
    let actual = sexpr::to_compact_string(&doc);
    assert_eq!(actual, expected, "input: {:?}", input);
}

#[track_caller]
fn compare(input: &str, expected: &str) {
    compare_opts(input, expected, &Options::default())
}

/// Compare with the named options switched on.  Boolean options only.
macro_rules! sexpr_opts {
    ([$($optclass:ident.$optname:ident),*], $lhs:expr, $rhs:expr) => {{
        #[allow(unused_mut)]
        let mut options = $crate::Options::default();
        $(options.$optclass.$optname = true;)*
        $crate::tests::compare_opts($lhs, $rhs, &options)
    }};
}

pub(crate) use sexpr_opts;
