use std::io::BufRead;

use super::super::error::{ParseError, Result};
use super::super::reader::Cursor;
use super::super::tokenizer::{Keyword, Token, Tokenizer};
use super::types::ParseResult;

pub(super) fn digit(chr: u8) -> bool {
    chr.is_ascii_digit()
}

pub(super) fn take_until(word: &str, pattern: u8) -> ParseResult<'_> {
    let new_start = word
        .bytes()
        .position(|chr| chr == pattern)
        .unwrap_or(word.len());

    ParseResult {
        matched: &word[0..new_start],
        residual: &word[new_start..],
    }
}

pub(super) fn take_while(word: &str, cond: fn(u8) -> bool) -> ParseResult<'_> {
    let new_start = word
        .bytes()
        .position(|chr| !cond(chr))
        .unwrap_or(word.len());

    ParseResult {
        matched: &word[0..new_start],
        residual: &word[new_start..],
    }
}

/// Matches `pattern` as a prefix of `word`. On a partial match, `matched` is
/// empty and the whole word is left as residual.
pub(super) fn tag<'a>(word: &'a str, pattern: &str) -> ParseResult<'a> {
    match word.strip_prefix(pattern) {
        Some(residual) => ParseResult {
            matched: &word[..pattern.len()],
            residual,
        },
        None => ParseResult {
            matched: "",
            residual: word,
        },
    }
}

/// Pulls the next token, treating the end of input as a grammar error since
/// `context` still needs more tokens.
pub(super) fn next_token<R: BufRead>(
    tokens: &mut Tokenizer<R>,
    context: &str,
) -> Result<(Token, Cursor)> {
    match tokens.next_token()? {
        Some(token) => Ok(token),
        None => Err(ParseError::grammar(
            tokens.cursor(),
            format!("unexpected end of input in {context}"),
        )),
    }
}

pub(super) fn word<R: BufRead>(
    tokens: &mut Tokenizer<R>,
    context: &str,
    what: &str,
) -> Result<(String, Cursor)> {
    match next_token(tokens, context)? {
        (Token::Word(word), cursor) => Ok((word, cursor)),
        (other, cursor) => Err(ParseError::grammar(
            cursor,
            format!("found {} in {context} but expected {what}", other.describe()),
        )),
    }
}

pub(super) fn ident<R: BufRead>(
    tokens: &mut Tokenizer<R>,
    keyword: Keyword,
    context: &str,
) -> Result<()> {
    match next_token(tokens, context)? {
        (Token::Keyword(found), _) if found == keyword => Ok(()),
        (other, cursor) => Err(ParseError::grammar(
            cursor,
            format!(
                "found {} in {context} but expected `{}`",
                other.describe(),
                keyword.as_str()
            ),
        )),
    }
}

/// Collects the words of an `$end` terminated text body.
pub(super) fn text_body<R: BufRead>(tokens: &mut Tokenizer<R>, context: &str) -> Result<Vec<String>> {
    let mut words = vec![];
    loop {
        match next_token(tokens, context)? {
            (Token::Keyword(Keyword::End), _) => return Ok(words),
            (Token::Word(word), _) => words.push(word),
            (other, cursor) => {
                return Err(ParseError::grammar(
                    cursor,
                    format!("found {} in {context} but expected text or `$end`", other.describe()),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_and_suffix_split() {
        let ParseResult { matched, residual } = take_while("100ps", digit);
        assert_eq!((matched, residual), ("100", "ps"));

        let ParseResult { matched, residual } = take_until("data[7:0]", b'[');
        assert_eq!((matched, residual), ("data", "[7:0]"));

        let ParseResult { matched, residual } = take_until("data", b'[');
        assert_eq!((matched, residual), ("data", ""));
    }

    #[test]
    fn tag_requires_full_prefix() {
        assert_eq!(tag("$scope", "$").residual, "scope");
        assert_eq!(tag("scope", "$").assert_match(), Err("no match".to_string()));
        assert_eq!(tag("$end", "$end").assert_match(), Ok("$end"));
    }

    #[test]
    fn text_body_stops_at_end() {
        let mut tokens = Tokenizer::new("$version Icarus Verilog $end $scope".as_bytes(), false);
        assert!(matches!(
            tokens.next_token().unwrap(),
            Some((Token::Keyword(Keyword::Version), _))
        ));
        let body = text_body(&mut tokens, "`$version`").unwrap();
        assert_eq!(body, vec!["Icarus".to_string(), "Verilog".to_string()]);
        assert!(matches!(
            tokens.next_token().unwrap(),
            Some((Token::Keyword(Keyword::Scope), _))
        ));
    }

    #[test]
    fn missing_end_is_grammar_error() {
        let mut tokens = Tokenizer::new("module top".as_bytes(), false);
        let _ = word(&mut tokens, "`$scope`", "scope kind").unwrap();
        let _ = word(&mut tokens, "`$scope`", "scope name").unwrap();
        let err = ident(&mut tokens, Keyword::End, "`$scope`").unwrap_err();
        assert!(err.message().contains("unexpected end of input"));
    }
}
