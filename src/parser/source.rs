//! A character source with bounded pushback.

use std::io::BufRead;

use crate::error::ParseError;

/// Reads characters one at a time from a [`BufRead`], allowing characters to
/// be pushed back and re-read.
///
/// Pushed-back characters form a stack, so `push_back_str` pushes in reverse
/// to re-read a string in its original order.  The stack holds at most
/// `limit` characters.
pub struct Source<R> {
    reader: R,
    chunk: String,
    pos: usize,
    pushback: Vec<char>,
    limit: usize,
    line: usize,
    transcript: String,
}

impl<R: BufRead> Source<R> {
    pub fn new(reader: R, limit: usize) -> Self {
        Source {
            reader,
            chunk: String::new(),
            pos: 0,
            pushback: Vec::new(),
            limit,
            line: 1,
            transcript: String::new(),
        }
    }

    /// The 1-based line of the next character to be read.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Everything read from the underlying reader so far.
    pub fn into_transcript(self) -> String {
        self.transcript
    }

    fn fetch(&mut self) -> Result<Option<char>, ParseError> {
        if self.pos >= self.chunk.len() {
            self.chunk.clear();
            self.pos = 0;
            if self.reader.read_line(&mut self.chunk)? == 0 {
                return Ok(None);
            }
            self.transcript.push_str(&self.chunk);
        }
        let c = self.chunk[self.pos..].chars().next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        Ok(c)
    }

    /// The next character, or `None` at the end of input.
    pub fn next(&mut self) -> Result<Option<char>, ParseError> {
        let c = match self.pushback.pop() {
            Some(c) => Some(c),
            None => self.fetch()?,
        };
        if c == Some('\n') {
            self.line += 1;
        }
        Ok(c)
    }

    /// Push `c` back so the next read returns it.
    pub fn push_back(&mut self, c: char) -> Result<(), ParseError> {
        if self.pushback.len() >= self.limit {
            return Err(ParseError::PushbackOverflow { limit: self.limit });
        }
        if c == '\n' {
            self.line -= 1;
        }
        self.pushback.push(c);
        Ok(())
    }

    /// Push back an optional character; `None` (end of input) is a no-op.
    pub fn unread(&mut self, c: Option<char>) -> Result<(), ParseError> {
        match c {
            Some(c) => self.push_back(c),
            None => Ok(()),
        }
    }

    /// Push `s` back so it is re-read in its original order.
    pub fn push_back_str(&mut self, s: &str) -> Result<(), ParseError> {
        for c in s.chars().rev() {
            self.push_back(c)?;
        }
        Ok(())
    }

    /// Look at the next character without consuming it.
    pub fn peek(&mut self) -> Result<Option<char>, ParseError> {
        let c = self.next()?;
        self.unread(c)?;
        Ok(c)
    }

    /// The rest of the current line, without its line end.  The stream
    /// position is unchanged.
    pub fn peek_line(&mut self) -> Result<String, ParseError> {
        let mut line = String::new();
        let mut end = None;
        while let Some(c) = self.next()? {
            if c == '\n' || c == '\r' {
                end = Some(c);
                break;
            }
            line.push(c);
        }
        self.unread(end)?;
        self.push_back_str(&line)?;
        Ok(line)
    }

    /// Consume characters while they are in `set`.
    pub fn read_while(&mut self, set: &str) -> Result<String, ParseError> {
        let mut out = String::new();
        loop {
            match self.next()? {
                Some(c) if set.contains(c) => out.push(c),
                other => {
                    self.unread(other)?;
                    return Ok(out);
                }
            }
        }
    }

    /// Consume characters until one in `stop` (which is left unread).
    pub fn read_until(&mut self, stop: &str) -> Result<String, ParseError> {
        let mut out = String::new();
        loop {
            match self.next()? {
                Some(c) if !stop.contains(c) => out.push(c),
                other => {
                    self.unread(other)?;
                    return Ok(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn source(s: &str) -> Source<Cursor<&[u8]>> {
        Source::new(Cursor::new(s.as_bytes()), 16)
    }

    #[test]
    fn reads_and_pushes_back() {
        let mut src = source("ab\ncd");
        assert_eq!(src.next().unwrap(), Some('a'));
        src.push_back('x').unwrap();
        assert_eq!(src.next().unwrap(), Some('x'));
        assert_eq!(src.next().unwrap(), Some('b'));
        src.push_back_str("yz").unwrap();
        assert_eq!(src.read_until("\n").unwrap(), "yz");
        assert_eq!(src.next().unwrap(), Some('\n'));
        assert_eq!(src.line(), 2);
        assert_eq!(src.read_while("cd").unwrap(), "cd");
        assert_eq!(src.next().unwrap(), None);
        assert_eq!(src.next().unwrap(), None);
    }

    #[test]
    fn peek_line_leaves_position() {
        let mut src = source("héllo world\nnext");
        assert_eq!(src.peek_line().unwrap(), "héllo world");
        assert_eq!(src.next().unwrap(), Some('h'));
        assert_eq!(src.peek_line().unwrap(), "éllo world");
        assert_eq!(src.read_until("\n").unwrap(), "éllo world");
        assert_eq!(src.peek_line().unwrap(), "");
        assert_eq!(src.line(), 1);
    }

    #[test]
    fn pushback_is_bounded() {
        let mut src = source("");
        for _ in 0..16 {
            src.push_back('a').unwrap();
        }
        assert!(matches!(
            src.push_back('a'),
            Err(ParseError::PushbackOverflow { limit: 16 })
        ));
    }

    #[test]
    fn invalid_utf8_is_an_io_error() {
        let bytes: &[u8] = &[b'a', 0xff, 0xfe, b'\n'];
        let mut src = Source::new(Cursor::new(bytes), 16);
        assert!(matches!(src.next(), Err(ParseError::Io(_))));
    }

    #[test]
    fn transcript_records_input_once() {
        let mut src = source("abc");
        while src.next().unwrap().is_some() {}
        src.push_back('c').unwrap();
        assert_eq!(src.next().unwrap(), Some('c'));
        assert_eq!(src.into_transcript(), "abc");
    }
}
