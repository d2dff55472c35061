//! Turns the words of a dump into typed tokens. Which class a word falls in
//! depends on where we are: inside `$date`/`$version`/`$timescale`/`$comment`
//! bodies everything up to `$end` is text, declarations are made of plain
//! words, and after `$enddefinitions` every word must be a timestamp or a
//! value change.
use std::io::{self, BufRead};

use super::error::{ParseError, Result};
use super::reader::{Cursor, WordReader};
use super::signal::Bit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    Date,
    Version,
    Timescale,
    Scope,
    Var,
    Upscope,
    EndDefinitions,
    DumpVars,
    DumpAll,
    DumpOn,
    DumpOff,
    Comment,
    End,
}

impl Keyword {
    fn from_word(word: &str) -> Option<Keyword> {
        let keyword = match word {
            "$date" => Keyword::Date,
            "$version" => Keyword::Version,
            "$timescale" => Keyword::Timescale,
            "$scope" => Keyword::Scope,
            "$var" => Keyword::Var,
            "$upscope" => Keyword::Upscope,
            "$enddefinitions" => Keyword::EndDefinitions,
            "$dumpvars" => Keyword::DumpVars,
            "$dumpall" => Keyword::DumpAll,
            "$dumpon" => Keyword::DumpOn,
            "$dumpoff" => Keyword::DumpOff,
            "$comment" => Keyword::Comment,
            "$end" => Keyword::End,
            _ => return None,
        };
        Some(keyword)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Keyword::Date => "$date",
            Keyword::Version => "$version",
            Keyword::Timescale => "$timescale",
            Keyword::Scope => "$scope",
            Keyword::Var => "$var",
            Keyword::Upscope => "$upscope",
            Keyword::EndDefinitions => "$enddefinitions",
            Keyword::DumpVars => "$dumpvars",
            Keyword::DumpAll => "$dumpall",
            Keyword::DumpOn => "$dumpon",
            Keyword::DumpOff => "$dumpoff",
            Keyword::Comment => "$comment",
            Keyword::End => "$end",
        }
    }

    fn opens_text_body(&self) -> bool {
        matches!(
            self,
            Keyword::Date | Keyword::Version | Keyword::Timescale | Keyword::Comment
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Radix {
    Binary,
    Octal,
    Hex,
    Decimal,
    Real,
    String,
}

impl Radix {
    fn from_marker(chr: u8) -> Option<Radix> {
        match chr {
            b'b' | b'B' => Some(Radix::Binary),
            b'o' | b'O' => Some(Radix::Octal),
            b'h' | b'H' => Some(Radix::Hex),
            b'd' | b'D' => Some(Radix::Decimal),
            b'r' | b'R' => Some(Radix::Real),
            b's' | b'S' => Some(Radix::String),
            _ => None,
        }
    }

    pub(crate) fn marker(&self) -> char {
        match self {
            Radix::Binary => 'b',
            Radix::Octal => 'o',
            Radix::Hex => 'h',
            Radix::Decimal => 'd',
            Radix::Real => 'r',
            Radix::String => 's',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Keyword(Keyword),
    Timestamp(u64),
    ScalarChange {
        bit: Bit,
        identifier: String,
    },
    VectorChange {
        radix: Radix,
        digits: String,
        identifier: String,
    },
    Word(String),
}

impl Token {
    /// Short human readable form used in diagnostics.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Keyword(keyword) => format!("`{}`", keyword.as_str()),
            Token::Timestamp(time) => format!("timestamp `#{time}`"),
            Token::ScalarChange { bit, identifier } => {
                format!("value change `{}{identifier}`", bit.as_char())
            }
            Token::VectorChange {
                radix,
                digits,
                identifier,
            } => format!("value change `{}{digits} {identifier}`", radix.marker()),
            Token::Word(word) => format!("`{word}`"),
        }
    }
}

pub(crate) struct Tokenizer<R> {
    words: WordReader<R>,
    in_text_body: bool,
    definitions_done: bool,
    trace_scanning: bool,
}

impl<R: BufRead> Tokenizer<R> {
    pub(crate) fn new(input: R, trace_scanning: bool) -> Tokenizer<R> {
        Tokenizer {
            words: WordReader::new(input),
            in_text_body: false,
            definitions_done: false,
            trace_scanning,
        }
    }

    fn read_word(&mut self) -> Result<Option<(&str, Cursor)>> {
        let fallback = self.words.cursor();
        match self.words.next_word() {
            Ok(word) => Ok(word),
            Err(err) if err.kind() == io::ErrorKind::InvalidData => Err(ParseError::lexical(
                fallback,
                "input is not valid UTF-8",
            )),
            Err(err) => Err(ParseError::read(fallback, err)),
        }
    }

    /// Where the next token would start; used for end-of-input diagnostics.
    pub(crate) fn cursor(&self) -> Cursor {
        self.words.cursor()
    }

    /// Produces the next token, or `None` at the end of the input.
    pub(crate) fn next_token(&mut self) -> Result<Option<(Token, Cursor)>> {
        let token = self.scan()?;
        if self.trace_scanning {
            if let Some((token, cursor)) = &token {
                tracing::trace!(target: "vcd::scan", ?cursor, ?token, "token");
            }
        }
        Ok(token)
    }

    fn scan(&mut self) -> Result<Option<(Token, Cursor)>> {
        let in_text_body = self.in_text_body;
        let definitions_done = self.definitions_done;

        let Some((word, cursor)) = self.read_word()? else {
            return Ok(None);
        };

        if in_text_body {
            if word == "$end" {
                self.in_text_body = false;
                return Ok(Some((Token::Keyword(Keyword::End), cursor)));
            }
            return Ok(Some((Token::Word(word.to_string()), cursor)));
        }

        // identifiers may start with `$` too, so an unknown `$` word is only
        // an error once no declaration can take it
        let keyword = match Keyword::from_word(word) {
            Some(keyword) => Some(keyword),
            None if word.starts_with('$') && definitions_done => {
                return Err(ParseError::lexical(
                    cursor,
                    format!("unknown keyword `{word}`"),
                ))
            }
            None => None,
        };

        if let Some(keyword) = keyword {
            if keyword.opens_text_body() {
                self.in_text_body = true;
            }
            if keyword == Keyword::EndDefinitions {
                self.definitions_done = true;
            }
            return Ok(Some((Token::Keyword(keyword), cursor)));
        }

        if !definitions_done {
            return Ok(Some((Token::Word(word.to_string()), cursor)));
        }

        let word = word.to_string();
        let token = self.classify_value(word, cursor)?;
        Ok(Some((token, cursor)))
    }

    fn classify_value(&mut self, word: String, cursor: Cursor) -> Result<Token> {
        let first = *word
            .as_bytes()
            .first()
            .ok_or_else(|| ParseError::lexical(cursor, "empty word"))?;
        // only meaningful when `first` is ascii, which every branch below checks
        let rest = word.get(1..).unwrap_or("");

        // #1250
        if first == b'#' {
            let time = rest.parse::<u64>().map_err(|_| {
                ParseError::lexical(cursor, format!("`{word}` is not a valid timestamp"))
            })?;
            return Ok(Token::Timestamp(time));
        }

        // 1!
        if let Some(bit) = Bit::from_char(first) {
            if rest.is_empty() {
                return Err(ParseError::lexical(
                    cursor,
                    format!("scalar value `{word}` has no identifier"),
                ));
            }
            return Ok(Token::ScalarChange {
                bit,
                identifier: rest.to_string(),
            });
        }

        // b1010 "
        if let Some(radix) = Radix::from_marker(first) {
            let digits = rest.to_string();
            let identifier = match self.read_word()? {
                Some((identifier, _)) => identifier.to_string(),
                None => {
                    return Err(ParseError::lexical(
                        cursor,
                        format!("vector value `{word}` has no identifier"),
                    ))
                }
            };
            return Ok(Token::VectorChange {
                radix,
                digits,
                identifier,
            });
        }

        Err(ParseError::lexical(
            cursor,
            format!("cannot classify `{word}` as a timestamp or value change"),
        ))
    }
}
