//! A single-pass parser for JSPWiki-style wiki markup.
//!
//! Markup goes in; a [`Document`] comes out: an arena-allocated tree of
//! elements, text, and deferred plugin and variable leaves, ready for a
//! renderer.  Everything the parser needs to know about the surrounding
//! wiki (which pages exist, attachments, interwiki prefixes, plugins, ACLs,
//! URL layout) is asked through the narrow traits in [`adapters`].
//!
//! ```
//! use wikitree::adapters::PageResolver;
//! use wikitree::{parse_document, Adapters, Options};
//!
//! struct OnePage;
//!
//! impl PageResolver for OnePage {
//!     fn resolve_page(&self, name: &str) -> Option<String> {
//!         (name == "FrontPage").then(|| name.to_string())
//!     }
//! }
//!
//! let adapters = Adapters {
//!     pages: Some(&OnePage),
//!     ..Adapters::default()
//! };
//! let doc = parse_document(
//!     "Main",
//!     "!!!Welcome\nSee [FrontPage] or [NewPage].",
//!     &Options::default(),
//!     &adapters,
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     doc.links(),
//!     [
//!         "#section-Main-Welcome",
//!         "Wiki.jsp?page=FrontPage",
//!         "Edit.jsp?page=NewPage",
//!     ]
//! );
//! ```
//!
//! Markup mistakes never fail a parse; they show up in the tree as
//! `span class="error"` elements.  Only a failing reader, or a pushback
//! overflow on a pathological line, returns a [`ParseError`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::new_without_default, clippy::too_many_arguments)]

pub mod adapters;
pub mod arena_tree;
pub mod document;
mod entity;
pub mod error;
pub mod nodes;
pub mod parser;
pub mod sexpr;
pub mod strings;

#[cfg(test)]
mod tests;

pub use adapters::Adapters;
pub use document::{Document, Heading, HeadingLevel};
pub use error::{ConfigError, ParseError};
pub use nodes::{Arena, Node, NodeValue};
pub use parser::options::{self, Extension, Hooks, Parse};
pub use parser::{parse_document, parse_reader, Options, Parser};

/// Parse `text` for `page` and return its text with all markup removed.
///
/// ```
/// # use wikitree::{markup_to_text, Adapters, Options};
/// let text = markup_to_text("Main", "__bold__ and ''italic''", &Options::default(), &Adapters::default())
///     .unwrap();
/// assert_eq!(text, "bold and italic");
/// ```
pub fn markup_to_text(
    page: &str,
    text: &str,
    options: &Options<'_>,
    adapters: &Adapters<'_>,
) -> Result<String, ParseError> {
    Ok(parse_document(page, text, options, adapters)?.text_content())
}
