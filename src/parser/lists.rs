//! Mixed `*`/`#` list nesting.
//!
//! The bullet run that starts a list line is compared against the run of the
//! previous list line, and turned into the open/close steps that move the
//! tree from one nesting to the other.  [`reconcile`] is pure; the parser
//! applies its steps with push and pop-by-name.

use std::cmp::min;
use std::io::BufRead;

use crate::error::ParseError;
use crate::nodes::NodeValue;
use crate::parser::{Outcome, Parser};

/// The two kinds of list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// `*`, rendered as `ul`.
    Bullet,
    /// `#`, rendered as `ol`.
    Ordered,
}

impl ListKind {
    fn from_bullet(c: u8) -> Self {
        match c {
            b'#' => ListKind::Ordered,
            _ => ListKind::Bullet,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// One step of moving between two nestings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOp {
    OpenList(ListKind),
    CloseList(ListKind),
    OpenItem,
    CloseItem,
}

/// Length of the common prefix of two bullet runs.
fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// The steps that turn the nesting described by `old` into the one described
/// by `new`, ending inside a fresh list item.
///
/// An empty `new` unwinds every level and opens nothing.
pub fn reconcile(old: &str, new: &str) -> Vec<ListOp> {
    let (old, new) = (old.as_bytes(), new.as_bytes());
    let common = common_prefix(old, new);
    let mut ops = vec![];

    for &bullet in old[common..].iter().rev() {
        ops.push(ListOp::CloseItem);
        ops.push(ListOp::CloseList(ListKind::from_bullet(bullet)));
    }

    if new.is_empty() {
        return ops;
    }

    if new.len() == common {
        ops.push(ListOp::CloseItem);
    }

    for (i, &bullet) in new[common..].iter().enumerate() {
        if i > 0 {
            ops.push(ListOp::OpenItem);
        }
        ops.push(ListOp::OpenList(ListKind::from_bullet(bullet)));
    }

    ops.push(ListOp::OpenItem);
    ops
}

/// PHPWiki compatibility: when the new run agrees with the previous one in
/// every overlapping bullet but the last, the previous prefix is kept and
/// only the final bullet comes from the new run.  A disagreement earlier in
/// the run, or in a single overlapping bullet, leaves the new run as written.
pub fn substitute_phpwiki(previous: &str, bullets: &str) -> String {
    let n = bullets.len();
    let level = previous.len();
    let overlap = min(n, level);
    if overlap < 2 {
        return bullets.to_string();
    }

    let last = overlap - 1;
    if bullets[..last] != previous[..last] || bullets[last..overlap] == previous[last..overlap] {
        return bullets.to_string();
    }

    if n <= level {
        format!("{}{}", &previous[..n - 1], &bullets[n - 1..])
    } else {
        format!("{}{}", previous, &bullets[level..])
    }
}

impl<'o, 'c, 'p, R: BufRead> Parser<'o, 'c, 'p, R> {
    /// A `*` or `#` at line start.  The bullet itself has been pushed back.
    pub(super) fn handle_list(&mut self) -> Result<Outcome, ParseError> {
        self.start_block_level()?;

        let mut bullets = self.source.read_while("*#")?;
        if self.options.extension.phpwiki_style_lists {
            bullets = substitute_phpwiki(&self.lists, &bullets);
        }

        let ops = reconcile(&self.lists, &bullets);
        self.apply_list_ops(&ops)?;
        self.source.read_while(" ")?;
        self.lists = bullets;

        Ok(Outcome::Markup)
    }

    /// Close every open list level.
    pub(super) fn unwind_lists(&mut self) -> Result<(), ParseError> {
        let ops = reconcile(&self.lists, "");
        self.apply_list_ops(&ops)?;
        self.lists.clear();
        Ok(())
    }

    fn apply_list_ops(&mut self, ops: &[ListOp]) -> Result<(), ParseError> {
        for op in ops {
            match *op {
                ListOp::OpenList(kind) => {
                    self.push(NodeValue::element(kind.tag()))?;
                }
                ListOp::CloseList(kind) => {
                    self.pop(kind.tag())?;
                }
                ListOp::OpenItem => {
                    self.push(NodeValue::element("li"))?;
                }
                ListOp::CloseItem => {
                    self.pop("li")?;
                }
            }
        }
        Ok(())
    }
}
