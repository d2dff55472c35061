use std::io::{self, BufRead};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line(pub(crate) usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Col(pub(crate) usize);
/// 1-based position of the first character of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cursor(pub(crate) Line, pub(crate) Col);

/// Splits a buffered source into whitespace separated words, one line at a
/// time. All scanning state lives here, so two readers never interact.
pub(crate) struct WordReader<R> {
    reader: R,
    line_buf: String,
    pos: usize,
    curr_line: usize,
    eof: bool,
}

impl<R: BufRead> WordReader<R> {
    pub(crate) fn new(reader: R) -> WordReader<R> {
        WordReader {
            reader,
            line_buf: String::new(),
            pos: 0,
            curr_line: 0,
            eof: false,
        }
    }

    /// Returns the next word and where it starts, or `None` once the source
    /// is exhausted.
    pub(crate) fn next_word(&mut self) -> io::Result<Option<(&str, Cursor)>> {
        loop {
            let bytes = self.line_buf.as_bytes();
            let mut start = self.pos;
            while start < bytes.len() && bytes[start].is_ascii_whitespace() {
                start += 1;
            }

            if start < bytes.len() {
                let mut end = start;
                while end < bytes.len() && !bytes[end].is_ascii_whitespace() {
                    end += 1;
                }
                self.pos = end;
                let cursor = Cursor(Line(self.curr_line), Col(start + 1));
                return Ok(Some((&self.line_buf[start..end], cursor)));
            }

            if self.eof {
                return Ok(None);
            }

            self.line_buf.clear();
            self.pos = 0;
            let bytes_read = self.reader.read_line(&mut self.line_buf)?;
            if bytes_read == 0 {
                self.eof = true;
                return Ok(None);
            }
            self.curr_line += 1;
        }
    }

    /// Position just past the last word handed out. Used to locate errors
    /// that happen at the end of the input.
    pub(crate) fn cursor(&self) -> Cursor {
        Cursor(Line(self.curr_line.max(1)), Col(self.pos + 1))
    }
}
