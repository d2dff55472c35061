use std::fmt;
use std::io;
use std::path::Path;

use thiserror::Error;

use super::reader::{Col, Cursor, Line};

/// A 1-based line/column position in the parsed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl From<Cursor> for Location {
    fn from(cursor: Cursor) -> Self {
        let Cursor(Line(line), Col(column)) = cursor;
        Location { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input could not be opened or read.
    Io,
    /// A run of characters did not classify as any token.
    Lexical,
    /// Tokens appeared in an order the grammar forbids.
    Grammar,
    /// A value change named an identifier no `$var` declared.
    UnknownIdentifier,
}

/// Failure of a single parse. Every fatal condition ends up here, and the
/// session reports it through its diagnostic sink before handing it back.
#[derive(Debug, Error)]
#[error("{}{}", at(.location), .message)]
pub struct ParseError {
    kind: ErrorKind,
    location: Option<Location>,
    message: String,
    #[source]
    source: Option<io::Error>,
}

fn at(location: &Option<Location>) -> String {
    match location {
        Some(location) => format!("{location}: "),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

impl ParseError {
    pub(crate) fn lexical(cursor: Cursor, message: impl Into<String>) -> Self {
        ParseError {
            kind: ErrorKind::Lexical,
            location: Some(cursor.into()),
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn grammar(cursor: Cursor, message: impl Into<String>) -> Self {
        ParseError {
            kind: ErrorKind::Grammar,
            location: Some(cursor.into()),
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn unknown_identifier(cursor: Cursor, identifier: &str) -> Self {
        ParseError {
            kind: ErrorKind::UnknownIdentifier,
            location: Some(cursor.into()),
            message: format!("value change references undeclared identifier `{identifier}`"),
            source: None,
        }
    }

    pub(crate) fn read(cursor: Cursor, source: io::Error) -> Self {
        ParseError {
            kind: ErrorKind::Io,
            location: Some(cursor.into()),
            message: format!("failed to read input: {source}"),
            source: Some(source),
        }
    }

    pub(crate) fn open(path: &Path, source: io::Error) -> Self {
        ParseError {
            kind: ErrorKind::Io,
            location: None,
            message: format!("cannot open {}: {source}", path.display()),
            source: Some(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Where in the source the parse was abandoned, if the failure happened
    /// after the input was opened.
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// The diagnostic text without the location prefix.
    pub fn message(&self) -> &str {
        &self.message
    }
}
