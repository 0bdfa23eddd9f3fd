//! Handlers for inline markup, plus the few block constructs introduced by a
//! single trigger character.

use std::io::BufRead;

use crate::entity;
use crate::error::ParseError;
use crate::nodes::{NodeElement, NodeValue};
use crate::parser::{Escape, Outcome, Parser, StyleBlock};
use crate::strings;

/// Characters `~` can escape.
const TILDE_ESCAPABLE: &str = "|~\\*#-!'_[{]}%";

/// Keep what a CSS class list may hold; `.` separates classes.
fn sanitize_class(raw: &str) -> String {
    raw.chars()
        .map(|c| if c == '.' { ' ' } else { c })
        .filter(|&c| {
            c.is_ascii_alphanumeric()
                || c == '_'
                || c == '-'
                || c.is_whitespace()
                || (!c.is_ascii() && c.is_alphabetic())
        })
        .collect()
}

impl<'o, 'c, 'p, R: BufRead> Parser<'o, 'c, 'p, R> {
    /// Close `tag` if it is open, otherwise open it.
    fn toggle(&mut self, tag: &str, open: bool) -> Result<(), ParseError> {
        if open {
            self.pop(tag)?;
        } else {
            self.push(NodeValue::element(tag))?;
        }
        Ok(())
    }

    /// `\\` is a line break, `\\\` one that clears floats.
    pub(super) fn handle_backslash(&mut self) -> Result<Outcome, ParseError> {
        match self.source.next()? {
            Some('\\') => {}
            other => {
                self.source.unread(other)?;
                return Ok(Outcome::Literal);
            }
        }

        let br = match self.source.next()? {
            Some('\\') => NodeElement::new("br").with("clear", "all"),
            other => {
                self.source.unread(other)?;
                NodeElement::new("br")
            }
        };
        self.add(br.into())?;
        Ok(Outcome::Markup)
    }

    /// `__` toggles bold.
    pub(super) fn handle_underscore(&mut self) -> Result<Outcome, ParseError> {
        match self.source.next()? {
            Some('_') => {
                self.toggle("b", self.inline.bold)?;
                self.inline.bold = !self.inline.bold;
                Ok(Outcome::Markup)
            }
            other => {
                self.source.unread(other)?;
                Ok(Outcome::Literal)
            }
        }
    }

    /// `''` toggles italic.
    pub(super) fn handle_apostrophe(&mut self) -> Result<Outcome, ParseError> {
        match self.source.next()? {
            Some('\'') => {
                self.toggle("i", self.inline.italic)?;
                self.inline.italic = !self.inline.italic;
                Ok(Outcome::Markup)
            }
            other => {
                self.source.unread(other)?;
                Ok(Outcome::Literal)
            }
        }
    }

    /// `{{` opens monospace; `{{{` opens a preformatted region, a `pre` at
    /// line start and an inline code span elsewhere.
    pub(super) fn handle_open_brace(&mut self, at_line_start: bool) -> Result<Outcome, ParseError> {
        match self.source.next()? {
            Some('{') => {}
            other => {
                self.source.unread(other)?;
                return Ok(Outcome::Literal);
            }
        }

        match self.source.next()? {
            Some('{') => {
                if at_line_start {
                    self.start_block_level()?;
                    self.push(NodeValue::element("pre"))?;
                    self.inline.escaping = Some(Escape::Block);
                } else {
                    self.push(
                        NodeElement::new("span")
                            .with("class", "inline-code")
                            .into(),
                    )?;
                    self.inline.escaping = Some(Escape::Inline);
                }
            }
            other => {
                self.source.unread(other)?;
                self.push(NodeValue::element("tt"))?;
            }
        }
        Ok(Outcome::Markup)
    }

    /// `}}}` ends a preformatted region (and is literal outside one); `}}`
    /// closes monospace.
    pub(super) fn handle_close_brace(&mut self) -> Result<Outcome, ParseError> {
        let second = self.source.next()?;
        if second == Some('}') {
            let third = self.source.next()?;
            if third == Some('}') {
                // The region's text is flushed while still escaping, so it
                // is never scanned for links.
                self.flush_text()?;
                match self.inline.escaping.take() {
                    Some(Escape::Block) => {
                        self.pop("pre")?;
                    }
                    Some(Escape::Inline) => {
                        self.pop("span")?;
                    }
                    None => self.text.push_str("}}}"),
                }
                return Ok(Outcome::Markup);
            }
            self.source.unread(third)?;
            if self.inline.escaping.is_none() {
                self.pop("tt")?;
                return Ok(Outcome::Markup);
            }
        }
        self.source.unread(second)?;
        Ok(Outcome::Literal)
    }

    /// Four or more dashes at line start make a horizontal rule.
    pub(super) fn handle_dash(&mut self) -> Result<Outcome, ParseError> {
        let dashes = self.source.read_while("-")?;
        if dashes.len() < 3 {
            self.source.push_back_str(&dashes)?;
            return Ok(Outcome::Literal);
        }

        self.start_block_level()?;
        self.add(NodeValue::element("hr"))?;
        Ok(Outcome::Markup)
    }

    /// `;` at line start opens a definition term; the driver turns the next
    /// `:` into the definition.
    pub(super) fn handle_definition(&mut self) -> Result<Outcome, ParseError> {
        self.inline.definition = true;
        self.start_block_level()?;
        self.push(NodeValue::element("dl"))?;
        self.push(NodeValue::element("dt"))?;
        Ok(Outcome::Markup)
    }

    /// `~` makes the next markup character literal.
    pub(super) fn handle_tilde(&mut self) -> Result<Outcome, ParseError> {
        match self.source.next()? {
            Some(c) if TILDE_ESCAPABLE.contains(c) => {
                self.text.push(c);
                Ok(Outcome::Markup)
            }
            other => {
                self.source.unread(other)?;
                Ok(Outcome::Literal)
            }
        }
    }

    /// Read up to the `close` matching an already consumed `open`.
    fn read_brace_content(&mut self, open: char, close: char) -> Result<String, ParseError> {
        let mut depth = 1;
        let mut out = String::new();
        while let Some(c) = self.source.next()? {
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            out.push(c);
        }
        Ok(out)
    }

    /// `%%(css)`, `%%class` or `%%class(css)` opens a styled block; a bare
    /// `%%` closes the most recent one.
    pub(super) fn handle_style(&mut self) -> Result<Outcome, ParseError> {
        match self.source.next()? {
            Some('%') => {}
            other => {
                self.source.unread(other)?;
                return Ok(Outcome::Literal);
            }
        }

        let mut style = None;
        let mut class = None;

        match self.source.next()? {
            Some('(') => style = Some(self.read_brace_content('(', ')')?),
            Some(c) if c.is_alphabetic() => {
                self.source.push_back(c)?;
                let raw = self.source.read_until("( \t\n\r")?;
                class = Some(sanitize_class(&raw));
                match self.source.next()? {
                    Some('(') => style = Some(self.read_brace_content('(', ')')?),
                    Some(' ') | Some('\t') => {}
                    other => self.source.unread(other)?,
                }
            }
            other => {
                self.source.unread(other)?;
                return self.close_style();
            }
        }

        let style = style.map(|s| entity::unescape_html(&s));
        if let Some(css) = &style {
            if strings::contains_javascript(css) {
                log::debug!("{}: refusing javascript in CSS: {:?}", self.page, css);
                self.add_error("Attempt to output javascript!")?;
                return Ok(Outcome::Markup);
            }
        }

        let rest = self.source.peek_line()?;
        let block = if rest.trim().is_empty() {
            self.start_block_level()?;
            StyleBlock::Div
        } else {
            StyleBlock::Span
        };

        let mut el = NodeElement::new(block.tag());
        if let Some(style) = style {
            el = el.with("style", style);
        }
        if let Some(class) = class {
            el = el.with("class", class);
        }
        self.styles.push(block);
        self.push(el.into())?;
        Ok(Outcome::Markup)
    }

    fn close_style(&mut self) -> Result<Outcome, ParseError> {
        match self.styles.pop() {
            Some(block) => {
                self.pop(block.tag())?;
            }
            None => {
                log::debug!("{}: closing a %%-block that was never opened", self.page);
            }
        }
        Ok(Outcome::Markup)
    }
}
