use std::io::BufRead;

use crate::error::ParseError;
use crate::nodes::{NodeElement, NodeValue};
use crate::parser::{Outcome, Parser};

impl<'o, 'c, 'p, R: BufRead> Parser<'o, 'c, 'p, R> {
    /// A `|`.  At line start it opens a table row (and the table, if
    /// needed); anywhere inside a table it starts a cell, `||` being a
    /// header cell.  Elsewhere it is literal.
    pub(super) fn handle_bar(&mut self, at_line_start: bool) -> Result<Outcome, ParseError> {
        if self.table_row.is_none() && !at_line_start {
            return Ok(Outcome::Literal);
        }

        if at_line_start {
            let row = match self.table_row {
                Some(row) => row + 1,
                None => {
                    self.start_block_level()?;
                    self.push(
                        NodeElement::new("table")
                            .with("class", "wikitable")
                            .with("border", "1")
                            .into(),
                    )?;
                    1
                }
            };
            self.table_row = Some(row);

            let mut tr = NodeElement::new("tr");
            if row % 2 == 1 {
                tr = tr.with("class", "odd");
            }
            self.push(tr.into())?;
        }

        let header = match self.source.next()? {
            Some('|') => true,
            other => {
                self.source.unread(other)?;
                false
            }
        };

        if !at_line_start {
            let (this, other) = if header { ("th", "td") } else { ("td", "th") };
            if self.pop(this)?.is_none() {
                self.pop(other)?;
            }
        }

        self.push(NodeValue::element(if header { "th" } else { "td" }))?;
        Ok(Outcome::Markup)
    }
}
