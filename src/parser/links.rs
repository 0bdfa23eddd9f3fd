//! Bracketed links: splitting, classification and construction.

use std::io::BufRead;

use phf::phf_set;

use crate::adapters::{is_access_rule_syntax, is_metadata_syntax, UrlKind};
use crate::error::ParseError;
use crate::nodes::{NodeElement, NodePlugin, NodeValue, NodeVariable};
use crate::parser::anchor;
use crate::parser::options::apply_chain;
use crate::parser::{Outcome, Parser};
use crate::strings::{clean_link, escape_html, is_number};

/// Schemes that make a link target external.
static EXTERNAL_SCHEMES: phf::Set<&'static str> = phf_set! {
    "http", "https", "ftp", "mailto", "news", "file", "rtsp", "mms", "ldap",
    "gopher", "nntp", "telnet", "wais", "prospero", "z39.50s", "z39.50r",
    "vemmi", "imap", "nfs", "acap", "tip", "pop", "dav", "opaquelocktoken",
    "sip", "sips", "tel", "fax", "modem", "soap.beep", "soap.beeps",
    "xmlrpc.beep", "xmlrpc.beeps", "urn", "go", "h323", "ipp", "tftp",
    "mupdate", "pres", "im", "mtqp", "smb",
};

/// Attributes a link may set through its third `|` segment.
static PERMITTED_ATTRIBUTES: phf::Set<&'static str> = phf_set! {
    "accesskey", "charset", "class", "dir", "hreflang", "id", "lang", "rel",
    "rev", "style", "tabindex", "target", "title", "type",
};

const IMAGE_MATCH: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Whether `target` starts with a known external scheme.
pub fn is_external_link(target: &str) -> bool {
    target
        .split_once(':')
        .map_or(false, |(scheme, _)| EXTERNAL_SCHEMES.contains(scheme))
}

/// Malformed `[text|target|attributes]` syntax.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct LinkSyntaxError(String);

/// The parts of `[text|target|attributes]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub text: String,
    pub reference: String,
    /// Whether the target was given separately from the text.
    pub has_reference: bool,
    pub attributes: Vec<(String, String)>,
}

impl Link {
    pub fn parse(contents: &str) -> Result<Link, LinkSyntaxError> {
        let contents = contents.trim();
        let Some((text, rest)) = contents.split_once('|') else {
            return Ok(Link {
                text: contents.to_string(),
                reference: contents.to_string(),
                has_reference: false,
                attributes: vec![],
            });
        };

        let (reference, attributes) = match rest.split_once('|') {
            Some((reference, attributes)) => (reference.trim(), parse_attributes(attributes)?),
            None => (rest.trim(), vec![]),
        };
        let text = match text.trim() {
            "" => reference,
            text => text,
        };

        Ok(Link {
            text: text.to_string(),
            reference: reference.to_string(),
            has_reference: true,
            attributes,
        })
    }

    /// `Prefix:Page`, when the target has a colon before any slash.
    pub fn interwiki(&self) -> Option<(&str, &str)> {
        let (prefix, page) = self.reference.split_once(':')?;
        if prefix.is_empty() || prefix.contains('/') {
            return None;
        }
        Some((prefix, page))
    }
}

/// `name='value' name="value" ...`.  Names outside the permitted set are
/// dropped.
fn parse_attributes(s: &str) -> Result<Vec<(String, String)>, LinkSyntaxError> {
    let mut attributes = vec![];
    let mut rest = s.trim_start();

    while !rest.is_empty() {
        let name_len = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        let name = &rest[..name_len];
        if name.is_empty() {
            return Err(LinkSyntaxError(format!("attribute name missing in {:?}", s)));
        }

        rest = rest[name_len..]
            .trim_start()
            .strip_prefix('=')
            .ok_or_else(|| LinkSyntaxError(format!("expected '=' after attribute {:?}", name)))?
            .trim_start();

        let quote = match rest.chars().next() {
            Some(q @ ('\'' | '"')) => q,
            _ => {
                return Err(LinkSyntaxError(format!(
                    "value of attribute {:?} must be quoted",
                    name
                )))
            }
        };
        rest = &rest[1..];
        let close = rest.find(quote).ok_or_else(|| {
            LinkSyntaxError(format!("unterminated value for attribute {:?}", name))
        })?;
        let value = &rest[..close];
        rest = rest[close + 1..].trim_start();

        let name = name.to_ascii_lowercase();
        if PERMITTED_ATTRIBUTES.contains(name.as_str()) {
            attributes.push((name, value.to_string()));
        } else {
            log::debug!("dropping link attribute {:?}", name);
        }
    }
    Ok(attributes)
}

/// Parse `[{SET name=value}]`.
fn parse_metadata(contents: &str) -> Option<(String, String)> {
    let body = contents.strip_suffix('}')?;
    let args = &body[body.find(' ')?..];
    let (name, value) = args.split_once('=')?;
    let value = value.trim();
    let value = value
        .strip_prefix(['\'', '"'])
        .unwrap_or(value);
    let value = value.strip_suffix(['\'', '"']).unwrap_or(value);
    Some((name.trim().to_string(), value.to_string()))
}

/// What [`Parser::make_link`] builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind<'a> {
    /// An existing page, optionally at a section.
    Read { fragment: Option<&'a str> },
    /// A page that does not exist yet.
    Edit,
    /// `[#n]`, a footnote anchor.
    Footnote,
    /// `[n]`, a link to footnote `n`.
    FootnoteRef,
    /// A bare inline image.
    Image,
    /// An inline image linking to an external URL.
    ImageLink { href: &'a str },
    /// An inline image linking to a page.
    ImageWikiLink { page: &'a str },
    External,
    Interwiki,
    Attachment,
}

impl<'o, 'c, 'p, R: BufRead> Parser<'o, 'c, 'p, R> {
    /// A `[`.  Reads up to the closing `]`, keeping `[{ ... }]` plugin
    /// invocations balanced, and hands the contents to the classifier.
    pub(super) fn handle_open_bracket(&mut self) -> Result<Outcome, ParseError> {
        let first = self.source.next()?;
        if first == Some('[') {
            self.text.push('[');
            while self.source.peek()? == Some('[') {
                self.source.next()?;
                self.text.push('[');
            }
            return Ok(Outcome::Markup);
        }
        self.source.unread(first)?;

        let is_plugin = first == Some('{');
        let mut contents = String::new();
        let mut nesting = 1;

        loop {
            let Some(c) = self.source.next()? else {
                log::debug!("{}: unterminated link", self.page);
                self.flush_text()?;
                self.text.push('[');
                self.text.push_str(&contents);
                self.flush_text_with(false)?;
                return Ok(Outcome::Markup);
            };

            if is_plugin {
                let next = self.source.peek()?;
                if c == '[' && next == Some('{') {
                    nesting += 1;
                } else if c == '}' && next == Some(']') {
                    nesting -= 1;
                    if nesting == 0 {
                        contents.push(c);
                        self.source.next()?;
                        break;
                    }
                }
            } else if c == ']' {
                break;
            }
            contents.push(c);
        }

        self.handle_hyperlink(&contents)
    }

    /// Classify bracket contents and emit the matching nodes.
    fn handle_hyperlink(&mut self, contents: &str) -> Result<Outcome, ParseError> {
        if is_access_rule_syntax(contents) {
            return self.handle_access_rule(contents);
        }
        if is_metadata_syntax(contents) {
            return self.handle_metadata(contents);
        }
        if self.adapters.is_plugin_invocation(contents) {
            return self.handle_plugin(contents);
        }

        let link = match Link::parse(contents) {
            Ok(link) => link,
            Err(e) => {
                log::info!("{}: parser failure in link {:?}: {}", self.page, contents, e);
                self.add_error(&format!("Parser failure: {}", e))?;
                return Ok(Outcome::Markup);
            }
        };
        let options = self.options;
        let hooks = &options.hooks;

        if self.adapters.is_variable_reference(&link.text) {
            self.add(NodeValue::Variable(NodeVariable {
                reference: link.text.clone(),
            }))?;
        } else if is_external_link(&link.reference) {
            let url = apply_chain(&hooks.external_link, link.reference.clone());
            if self.is_image_link(&url) {
                self.handle_image_link(&url, &link.text, link.has_reference)?;
            } else {
                self.make_link(LinkKind::External, &url, &link.text, &link.attributes)?;
                self.add_outlink_image()?;
            }
        } else if let Some((prefix, remote)) = link.interwiki() {
            match self.adapters.resolve_interwiki(prefix) {
                Some(template) => {
                    let url = apply_chain(&hooks.external_link, template.replace("%s", remote));
                    if self.is_image_link(&url) {
                        self.handle_image_link(&url, &link.text, link.has_reference)?;
                    } else {
                        self.make_link(LinkKind::Interwiki, &url, &link.text, &link.attributes)?;
                    }
                    if is_external_link(&url) {
                        self.add_outlink_image()?;
                    }
                }
                None => {
                    self.add_error(&format!("No InterWiki reference defined for \"{}\"", prefix))?;
                }
            }
        } else if link.reference.starts_with('#') {
            self.make_link(LinkKind::Footnote, &link.reference, &link.text, &link.attributes)?;
        } else if is_number(&link.reference) {
            self.make_link(LinkKind::FootnoteRef, &link.reference, &link.text, &link.attributes)?;
        } else if let Some(attachment) = self.adapters.find_attachment(&link.reference) {
            let attachment = apply_chain(&hooks.attachment_link, attachment);
            if self.is_image_link(&link.reference) {
                let url = self.adapters.url(UrlKind::Attach, &attachment, None);
                self.handle_image_link(&url, &link.text, link.has_reference)?;
            } else {
                self.make_link(LinkKind::Attachment, &attachment, &link.text, &link.attributes)?;
            }
        } else if let Some((page, section)) = link.reference.split_once('#') {
            let page = apply_chain(&hooks.local_link, clean_link(page));
            match self.adapters.resolve_page(&page) {
                Some(matched) => {
                    let fragment = anchor::section_fragment(&matched, section);
                    let kind = LinkKind::Read {
                        fragment: Some(&fragment),
                    };
                    self.make_link(kind, &matched, &link.text, &link.attributes)?;
                }
                None => self.make_link(LinkKind::Edit, &page, &link.text, &link.attributes)?,
            }
        } else {
            let page = apply_chain(&hooks.local_link, clean_link(&link.reference));
            self.make_page_link(&page, &link.text, &link.attributes)?;
        }

        Ok(Outcome::Markup)
    }

    fn handle_access_rule(&mut self, contents: &str) -> Result<Outcome, ParseError> {
        if self.clean || !self.options.extension.access_rules {
            return Ok(Outcome::Markup);
        }
        let rule = contents.strip_prefix('{').unwrap_or(contents);
        let rule = rule.strip_suffix('}').unwrap_or(rule).trim();
        if let Err(e) = self.adapters.apply_access_rule(rule) {
            log::info!("{}: invalid access rule {:?}: {}", self.page, rule, e);
            self.add_error(&format!("Access rule parsing failed: {}", e))?;
        }
        Ok(Outcome::Markup)
    }

    fn handle_metadata(&mut self, contents: &str) -> Result<Outcome, ParseError> {
        if self.clean || !self.options.extension.metadata {
            return Ok(Outcome::Markup);
        }
        match parse_metadata(contents) {
            Some((name, value)) => {
                if !name.is_empty() && !value.is_empty() {
                    let value = self.adapters.expand_variables(&value);
                    self.metadata.insert(name, value);
                }
            }
            None => {
                log::info!("{}: invalid SET {:?}", self.page, contents);
                self.add_error(&format!("Invalid SET: {}", contents))?;
            }
        }
        Ok(Outcome::Markup)
    }

    fn handle_plugin(&mut self, contents: &str) -> Result<Outcome, ParseError> {
        if self.clean {
            return Ok(Outcome::Markup);
        }
        match self.adapters.execute_plugin(contents) {
            Ok(content) => {
                self.add(NodeValue::Plugin(NodePlugin {
                    invocation: contents.to_string(),
                    content,
                }))?;
            }
            Err(e) => {
                log::info!("{}: failed to insert plugin: {}", self.page, e);
                self.add_error(&format!("Plugin insertion failed: {}", e))?;
            }
        }
        Ok(Outcome::Markup)
    }

    /// Whether `target` should be shown inline as an image.
    pub(crate) fn is_image_link(&self, target: &str) -> bool {
        self.options.extension.inline_images
            && self
                .image_patterns
                .iter()
                .any(|p| p.matches_with(target, IMAGE_MATCH))
    }

    /// An image at `src`.  When `text` was given explicitly and is a URL or
    /// an existing page, the image links there.
    pub(crate) fn handle_image_link(
        &mut self,
        src: &str,
        text: &str,
        has_text: bool,
    ) -> Result<(), ParseError> {
        if has_text && is_external_link(text) {
            return self.make_link(LinkKind::ImageLink { href: text }, src, text, &[]);
        }
        if has_text {
            if let Some(page) = self.adapters.resolve_page(&clean_link(text)) {
                let page = apply_chain(&self.options.hooks.local_link, page);
                return self.make_link(LinkKind::ImageWikiLink { page: &page }, src, text, &[]);
            }
        }
        self.make_link(LinkKind::Image, src, text, &[])
    }

    /// A link to `page`, which is read if it exists and created otherwise.
    pub(crate) fn make_page_link(
        &mut self,
        page: &str,
        text: &str,
        attributes: &[(String, String)],
    ) -> Result<(), ParseError> {
        match self.adapters.resolve_page(page) {
            Some(matched) => {
                self.make_link(LinkKind::Read { fragment: None }, &matched, text, attributes)
            }
            None => self.make_link(LinkKind::Edit, page, text, attributes),
        }
    }

    /// The small icon that follows external links.
    pub(crate) fn add_outlink_image(&mut self) -> Result<(), ParseError> {
        if !self.options.parse.use_outlink_image {
            return Ok(());
        }
        let src = self.adapters.url(UrlKind::Resource, "images/out.png", None);
        self.add(
            NodeElement::new("img")
                .with("class", "outlink")
                .with("src", src)
                .with("alt", "")
                .into(),
        )?;
        Ok(())
    }

    /// Emit a link of the given kind.  An empty target yields underlined
    /// text instead.
    pub(crate) fn make_link(
        &mut self,
        kind: LinkKind<'_>,
        target: &str,
        text: &str,
        attributes: &[(String, String)],
    ) -> Result<(), ParseError> {
        let text = apply_chain(&self.options.hooks.link_text, text.to_string());

        if target.is_empty() {
            let u = self.add(NodeValue::element("u"))?;
            self.attach(u, NodeValue::Text(escape_html(&text, true)))?;
            return Ok(());
        }

        let image = || {
            NodeElement::new("img")
                .with("class", "inline")
                .with("src", target)
                .with("alt", text.as_str())
        };
        let anchor = |class: &str, href: String| {
            NodeElement::new("a").with("class", class).with("href", href)
        };

        let (mut el, label) = match kind {
            LinkKind::Read { fragment } => (
                anchor("wikipage", self.adapters.url(UrlKind::View, target, fragment)),
                Some(text.clone()),
            ),
            LinkKind::Edit => (
                anchor("createpage", self.adapters.url(UrlKind::Edit, target, None))
                    .with("title", format!("Create '{}'", target)),
                Some(text.clone()),
            ),
            LinkKind::Footnote => (
                NodeElement::new("a")
                    .with("class", "footnote")
                    .with("name", format!("ref-{}-{}", self.page, &target[1..])),
                Some(format!("[{}]", text)),
            ),
            LinkKind::FootnoteRef => (
                anchor("footnoteref", format!("#ref-{}-{}", self.page, target)),
                Some(format!("[{}]", text)),
            ),
            LinkKind::Image => (image(), None),
            LinkKind::ImageLink { href } => (anchor("external", href.to_string()), None),
            LinkKind::ImageWikiLink { page } => (
                anchor("wikipage", self.adapters.url(UrlKind::View, page, None)),
                None,
            ),
            LinkKind::External => {
                let mut el = anchor("external", target.to_string());
                if self.options.parse.use_rel_nofollow {
                    el = el.with("rel", "nofollow");
                }
                (el, Some(text.clone()))
            }
            LinkKind::Interwiki => (anchor("interwiki", target.to_string()), Some(text.clone())),
            LinkKind::Attachment => (
                anchor("attachment", self.adapters.url(UrlKind::Attach, target, None)),
                Some(text.clone()),
            ),
        };

        for (name, value) in attributes {
            el = el.with(name, value.as_str());
        }

        let wrapped_image = matches!(
            kind,
            LinkKind::ImageLink { .. } | LinkKind::ImageWikiLink { .. }
        )
        .then(image);

        let node = self.add(el.into())?;
        if let Some(img) = wrapped_image {
            self.attach(node, img.into())?;
        }
        if let Some(label) = label {
            self.attach(node, NodeValue::Text(escape_html(&label, true)))?;
        }

        if kind == LinkKind::Attachment {
            let info = self.add(
                anchor("infolink", self.adapters.url(UrlKind::Info, target, None)).into(),
            )?;
            let icon = self
                .adapters
                .url(UrlKind::Resource, "images/attachment_small.png", None);
            self.attach(
                info,
                NodeElement::new("img")
                    .with("src", icon)
                    .with("alt", "(info)")
                    .into(),
            )?;
        }
        Ok(())
    }
}
