//! Flushing buffered text, with CamelCase and bare-URI detection.

use std::io::BufRead;
use std::mem;

use unicode_categories::UnicodeCategories;

use crate::error::ParseError;
use crate::parser::options::apply_chain;
use crate::parser::links::LinkKind;
use crate::parser::Parser;
use crate::strings::escape_html;

/// Schemes recognised in running text.
const URI_SCHEMES: &[&str] = &["http://", "https://", "mailto:", "ftp://"];

/// Buffers this short are never scanned.
const MIN_SCAN_CHARS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutolinkKind {
    CamelCase,
    Uri,
}

/// A match in `prefix token` form: `start..token` is the run of
/// non-alphanumerics before the token, `token..end` the token itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutolinkMatch {
    pub start: usize,
    pub token: usize,
    pub end: usize,
    pub kind: AutolinkKind,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

fn is_uri_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_/.+?#-@=&;~%".contains(c)
}

/// Bytes of `s` before the first character failing `pred`.
fn span(s: &str, pred: impl Fn(char) -> bool) -> usize {
    s.char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(s.len(), |(i, _)| i)
}

/// Upper+ lower+ upper+ alnum*, anchored at the start of `s`.
fn camel_case_len(s: &str) -> Option<usize> {
    let upper = span(s, |c| c.is_letter_uppercase());
    if upper == 0 {
        return None;
    }
    let lower = span(&s[upper..], |c| c.is_letter_lowercase());
    if lower == 0 {
        return None;
    }
    let at = upper + lower;
    let upper2 = span(&s[at..], |c| c.is_letter_uppercase());
    if upper2 == 0 {
        return None;
    }
    let at = at + upper2;
    Some(at + span(&s[at..], is_word_char))
}

/// A recognised scheme followed by at least one URI character.
fn uri_len(s: &str) -> Option<usize> {
    let scheme = URI_SCHEMES.iter().find(|scheme| s.starts_with(**scheme))?;
    match span(&s[scheme.len()..], is_uri_char) {
        0 => None,
        rest => Some(scheme.len() + rest),
    }
}

/// Find the leftmost CamelCase word or URI in `s`.  A token must start the
/// string or follow a non-alphanumeric character.
pub fn find_autolink(s: &str, camel_case: bool, uris: bool) -> Option<AutolinkMatch> {
    let mut run_start = 0;
    let mut previous: Option<char> = None;

    for (i, c) in s.char_indices() {
        match previous {
            Some(p) if is_word_char(p) => run_start = i,
            _ => {}
        }

        let candidate = previous.map_or(true, |p| !is_word_char(p));
        if candidate {
            let rest = &s[i..];
            if camel_case {
                if let Some(len) = camel_case_len(rest) {
                    return Some(AutolinkMatch {
                        start: run_start,
                        token: i,
                        end: i + len,
                        kind: AutolinkKind::CamelCase,
                    });
                }
            }
            if uris {
                if let Some(len) = uri_len(rest) {
                    return Some(AutolinkMatch {
                        start: run_start,
                        token: i,
                        end: i + len,
                        kind: AutolinkKind::Uri,
                    });
                }
            }
        }
        previous = Some(c);
    }
    None
}

impl<'o, 'c, 'p, R: BufRead> Parser<'o, 'c, 'p, R> {
    fn escape_text(&self, text: &str) -> String {
        if self.options.parse.allow_raw_html {
            text.to_string()
        } else {
            escape_html(text, true)
        }
    }

    /// Move buffered text into the tree.
    pub(crate) fn flush_text(&mut self) -> Result<(), ParseError> {
        let scan = self.inline.escaping.is_none();
        self.flush_text_with(scan)
    }

    /// Move buffered text into the tree, optionally linking CamelCase words
    /// and bare URIs found in it.
    pub(crate) fn flush_text_with(&mut self, scan: bool) -> Result<(), ParseError> {
        if self.text.is_empty() {
            return Ok(());
        }
        let buf = mem::take(&mut self.text);

        let camel_case = self.options.extension.camel_case_links;
        let uris = self.options.extension.plain_uris;
        if !scan || !(camel_case || uris) || buf.chars().count() < MIN_SCAN_CHARS {
            let text = self.escape_text(&buf);
            return self.append_text(&text);
        }

        let mut rest = &buf[..];
        while let Some(m) = find_autolink(rest, camel_case, uris) {
            let before = self.escape_text(&rest[..m.start]);
            self.append_text(&before)?;

            let prefix = &rest[m.start..m.token];
            let mut end = m.end;
            if m.kind == AutolinkKind::Uri {
                end = m.token + rest[m.token..m.end].trim_end_matches(['.', ',']).len();
            }
            let token = &rest[m.token..end];

            if prefix.ends_with('~') || prefix.contains('[') {
                let prefix = prefix.strip_suffix('~').unwrap_or(prefix);
                let literal = self.escape_text(&format!("{}{}", prefix, token));
                self.append_text(&literal)?;
            } else {
                let prefix = self.escape_text(prefix);
                self.append_text(&prefix)?;
                match m.kind {
                    AutolinkKind::Uri => self.make_direct_uri_link(token)?,
                    AutolinkKind::CamelCase => self.make_camel_case_link(token)?,
                }
            }
            rest = &rest[end..];
        }

        let tail = self.escape_text(rest);
        self.append_text(&tail)
    }

    fn make_camel_case_link(&mut self, word: &str) -> Result<(), ParseError> {
        let word = apply_chain(&self.options.hooks.local_link, word.to_string());
        self.make_page_link(&word, &word, &[])
    }

    fn make_direct_uri_link(&mut self, uri: &str) -> Result<(), ParseError> {
        let uri = apply_chain(&self.options.hooks.external_link, uri.to_string());
        if self.is_image_link(&uri) {
            self.handle_image_link(&uri, &uri, false)
        } else {
            self.make_link(LinkKind::External, &uri, &uri, &[])?;
            self.add_outlink_image()
        }
    }
}
