//! Configuration for the parser.

#[cfg(feature = "bon")]
use bon::Builder;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::document::Heading;
use crate::error::ConfigError;

#[derive(Default, Debug, Clone)]
/// Umbrella options struct.
pub struct Options<'c> {
    /// Select markup extensions.
    pub extension: Extension,

    /// Configure parse-time behaviour.
    pub parse: Parse,

    /// Callbacks run while parsing.
    pub hooks: Hooks<'c>,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "bon", derive(Builder))]
/// Options to select markup extensions.
pub struct Extension {
    /// Turn bare `CamelCase` words into page links.
    ///
    /// ```rust
    /// # use wikitree::{parse_document, Adapters, Options};
    /// let mut options = Options::default();
    /// options.extension.camel_case_links = true;
    /// let doc = parse_document("Main", "See FrontPage.", &options, &Adapters::default()).unwrap();
    /// assert_eq!(doc.links(), ["Edit.jsp?page=FrontPage"]);
    /// ```
    #[cfg_attr(feature = "bon", builder(default))]
    pub camel_case_links: bool,

    /// Turn bare `http://`, `https://`, `ftp://` and `mailto:` URIs in text
    /// into external links.
    #[cfg_attr(feature = "bon", builder(default))]
    pub plain_uris: bool,

    /// Render links whose target matches [`inline_image_patterns`][0] as
    /// images.
    ///
    /// [0]: Self::inline_image_patterns
    #[cfg_attr(feature = "bon", builder(default = true))]
    pub inline_images: bool,

    /// Glob patterns, matched case-insensitively against the whole link
    /// target, that mark a target as an image.
    #[cfg_attr(feature = "bon", builder(default = default_image_patterns()))]
    pub inline_image_patterns: Vec<String>,

    /// Let a bullet run that disagrees with the previous one only in the
    /// last shared bullet keep the previous prefix, so `**` followed by `*#*`
    /// nests one bullet list deeper.
    #[cfg_attr(feature = "bon", builder(default = true))]
    pub phpwiki_style_lists: bool,

    /// Hand `[{ALLOW ...}]`/`[{DENY ...}]` rules to the ACL adapter.  When
    /// off, such brackets are consumed silently.
    #[cfg_attr(feature = "bon", builder(default = true))]
    pub access_rules: bool,

    /// Record `[{SET name=value}]` as page metadata.  When off, such
    /// brackets are consumed silently.
    #[cfg_attr(feature = "bon", builder(default = true))]
    pub metadata: bool,
}

fn default_image_patterns() -> Vec<String> {
    ["*.png", "*.jpg", "*.jpeg", "*.gif", "*.webp", "*.svg"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Extension {
    fn default() -> Self {
        Extension {
            camel_case_links: false,
            plain_uris: false,
            inline_images: true,
            inline_image_patterns: default_image_patterns(),
            phpwiki_style_lists: true,
            access_rules: true,
            metadata: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "bon", derive(Builder))]
/// Options for parse-time behaviour.
pub struct Parse {
    /// Pass `<`, `>` and `&` in text through untouched instead of escaping
    /// them.  Preformatted regions are always escaped.
    #[cfg_attr(feature = "bon", builder(default))]
    pub allow_raw_html: bool,

    /// Follow every external link with a small outward-link icon.
    #[cfg_attr(feature = "bon", builder(default = true))]
    pub use_outlink_image: bool,

    /// Mark external links `rel="nofollow"`.
    #[cfg_attr(feature = "bon", builder(default))]
    pub use_rel_nofollow: bool,

    /// How many characters the source may hold in pushback.  Exceeding it
    /// aborts the parse.
    #[cfg_attr(feature = "bon", builder(default = 10 * 1024))]
    pub pushback_limit: usize,
}

impl Default for Parse {
    fn default() -> Self {
        Parse {
            allow_raw_html: false,
            use_outlink_image: true,
            use_rel_nofollow: false,
            pushback_limit: 10 * 1024,
        }
    }
}

/// Rewrites a link target or link text.
pub trait LinkMutator: Send + Sync {
    /// Return the replacement for `s`.
    fn mutate(&self, s: &str) -> String;
}

impl<F> LinkMutator for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn mutate(&self, s: &str) -> String {
        self(s)
    }
}

/// Observes every heading as it is parsed.
pub trait HeadingListener: Send + Sync {
    /// Called once per heading, in document order.
    fn heading(&self, heading: &Heading);
}

impl<F> HeadingListener for F
where
    F: Fn(&Heading) + Send + Sync,
{
    fn heading(&self, heading: &Heading) {
        self(heading)
    }
}

/// A chain of mutators, applied in registration order.
pub type MutatorChain<'c> = Vec<Arc<dyn LinkMutator + 'c>>;

/// Callbacks run while parsing.
#[derive(Default, Clone)]
pub struct Hooks<'c> {
    /// Applied to the display text of every link.
    pub link_text: MutatorChain<'c>,

    /// Applied to local page names before lookup.
    pub local_link: MutatorChain<'c>,

    /// Applied to external and resolved interwiki URLs.
    pub external_link: MutatorChain<'c>,

    /// Applied to resolved attachment names.
    pub attachment_link: MutatorChain<'c>,

    /// Told about every heading.
    pub heading_listeners: Vec<Arc<dyn HeadingListener + 'c>>,
}

impl Debug for Hooks<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("link_text", &self.link_text.len())
            .field("local_link", &self.local_link.len())
            .field("external_link", &self.external_link.len())
            .field("attachment_link", &self.attachment_link.len())
            .field("heading_listeners", &self.heading_listeners.len())
            .finish()
    }
}

pub(crate) fn apply_chain(chain: &MutatorChain<'_>, s: String) -> String {
    chain.iter().fold(s, |acc, m| m.mutate(&acc))
}

impl Options<'_> {
    /// Read options from `key = value` properties text.
    ///
    /// Lines starting with `#` or `!` are comments.  Keys not recognised are
    /// ignored with a warning.
    ///
    /// ```rust
    /// # use wikitree::Options;
    /// let options = Options::from_properties(
    ///     "markup.camelCaseLinks = true\nmarkup.inlinePattern.1 = *.bmp\n",
    /// ).unwrap();
    /// assert!(options.extension.camel_case_links);
    /// assert_eq!(options.extension.inline_image_patterns, ["*.bmp"]);
    /// ```
    pub fn from_properties(text: &str) -> Result<Self, ConfigError> {
        let mut options = Options::default();
        options.apply_properties(text)?;
        Ok(options)
    }

    /// Layer properties text on top of these options.
    pub fn apply_properties(&mut self, text: &str) -> Result<(), ConfigError> {
        let mut patterns = vec![];

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let split = match line.find(|c| c == '=' || c == ':') {
                Some(ix) => ix,
                None => {
                    log::warn!("ignoring property line without a value: {:?}", line);
                    continue;
                }
            };
            let key = line[..split].trim();
            let value = line[split + 1..].trim();

            match key {
                "markup.allowHTML" => self.parse.allow_raw_html = parse_bool(key, value)?,
                "markup.camelCaseLinks" => {
                    self.extension.camel_case_links = parse_bool(key, value)?
                }
                "markup.plainUris" => self.extension.plain_uris = parse_bool(key, value)?,
                "markup.useOutlinkImage" => {
                    self.parse.use_outlink_image = parse_bool(key, value)?
                }
                "markup.useRelNofollow" => self.parse.use_rel_nofollow = parse_bool(key, value)?,
                "markup.inlineImages" => self.extension.inline_images = parse_bool(key, value)?,
                "markup.accessRules" => self.extension.access_rules = parse_bool(key, value)?,
                "markup.metadata" => self.extension.metadata = parse_bool(key, value)?,
                "markup.phpWikiStyleLists" => {
                    self.extension.phpwiki_style_lists = parse_bool(key, value)?
                }
                "markup.pushbackLimit" => match value.parse::<usize>() {
                    Ok(n) if n > 0 => self.parse.pushback_limit = n,
                    _ => {
                        return Err(ConfigError::InvalidNumber {
                            key: key.to_string(),
                            value: value.to_string(),
                        })
                    }
                },
                _ if key.starts_with("markup.inlinePattern.") => {
                    if let Err(e) = glob::Pattern::new(value) {
                        return Err(ConfigError::InvalidPattern {
                            pattern: value.to_string(),
                            reason: e.msg.to_string(),
                        });
                    }
                    patterns.push(value.to_string());
                }
                _ => log::warn!("ignoring unknown property {:?}", key),
            }
        }

        if !patterns.is_empty() {
            self.extension.inline_image_patterns = patterns;
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Compile image globs, dropping (and logging) any that do not compile.
pub(crate) fn compile_image_patterns(patterns: &[String]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(p) => Some(p),
            Err(e) => {
                log::warn!("skipping invalid image pattern {:?}: {}", p, e);
                None
            }
        })
        .collect()
}
