use std::io::BufRead;

use super::error::{ParseError, Result};
use super::tokenizer::{Keyword, Token, Tokenizer};

mod actions;
mod combinator_atoms;
mod events;
mod metadata;
mod scopes;
mod types;

pub(crate) use actions::ParseState;
use combinator_atoms::ident;
use events::parse_events;
use metadata::parse_header_item;
use scopes::{parse_scope, parse_upscope, parse_var};

/// Header items, comments and the scope tree, up to and including
/// `$enddefinitions $end`.
fn parse_declarations<R: BufRead>(tokens: &mut Tokenizer<R>, state: &mut ParseState) -> Result<()> {
    loop {
        let token = match tokens.next_token()? {
            Some(token) => token,
            None => {
                let msg = match state.open_scope_name() {
                    Some(name) => format!(
                        "unexpected end of input while scope `{name}` is still open"
                    ),
                    None => "unexpected end of input before `$enddefinitions`".to_string(),
                };
                return Err(ParseError::grammar(tokens.cursor(), msg));
            }
        };

        match token {
            (Token::Keyword(
                keyword @ (Keyword::Date | Keyword::Version | Keyword::Timescale | Keyword::Comment),
            ), _) => parse_header_item(keyword, tokens, state)?,
            (Token::Keyword(Keyword::Scope), _) => parse_scope(tokens, state)?,
            // vars outside any scope land in the root scope
            (Token::Keyword(Keyword::Var), _) => parse_var(tokens, state)?,
            (Token::Keyword(Keyword::Upscope), cursor) => parse_upscope(tokens, state, cursor)?,
            (Token::Keyword(Keyword::EndDefinitions), cursor) => {
                if let Some(name) = state.open_scope_name() {
                    return Err(ParseError::grammar(
                        cursor,
                        format!("`$enddefinitions` while scope `{name}` is still open"),
                    ));
                }
                if !state.has_declarations() {
                    return Err(ParseError::grammar(
                        cursor,
                        "`$enddefinitions` before any `$scope` or `$var`",
                    ));
                }
                return ident(tokens, Keyword::End, "`$enddefinitions`");
            }
            (other, cursor) => {
                return Err(ParseError::grammar(
                    cursor,
                    format!(
                        "found {} but expected a header item, `$scope`, `$var`, \
                         `$upscope` or `$enddefinitions`",
                        other.describe()
                    ),
                ))
            }
        }
    }
}

/// Drives the whole grammar over `tokens`, applying every semantic action to
/// `state`. The first error abandons the parse; nothing is recovered.
pub(crate) fn parse_trace<R: BufRead>(tokens: &mut Tokenizer<R>, state: &mut ParseState) -> Result<()> {
    parse_declarations(tokens, state)?;
    parse_events(tokens, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcd::error::ErrorKind;
    use crate::vcd::signal::{Bit, Value};
    use crate::vcd::types::Trace;

    fn parse(src: &str) -> Result<Trace> {
        let mut tokens = Tokenizer::new(src.as_bytes(), false);
        let mut state = ParseState::new();
        state.begin(0, u64::MAX, false);
        match parse_trace(&mut tokens, &mut state) {
            Ok(()) => Ok(state.finish()),
            Err(err) => {
                state.abandon();
                Err(err)
            }
        }
    }

    #[test]
    fn headers_and_scopes() {
        let trace = parse(
            "$date\n   Test VCD file\n$end\n\
             $version\n   VCD Generator 1.0\n$end\n\
             $timescale 1ns $end\n\
             $scope module testbench $end\n\
             $var wire 1 ! sig0 $end\n\
             $upscope $end\n\
             $enddefinitions $end\n\
             $dumpvars\n0!\n$end\n\
             #10\n1!\n",
        )
        .unwrap();

        assert_eq!(trace.metadata().date.as_deref(), Some("Test VCD file"));
        assert_eq!(trace.metadata().timescale.as_deref(), Some("1ns"));
        assert_eq!(trace.signals().len(), 1);
        assert_eq!(trace.time_steps().len(), 2);
        assert_eq!(
            trace.time_steps()[1].value_of("!"),
            Some(&Value::Scalar(Bit::One))
        );
    }

    #[test]
    fn root_level_vars() {
        let trace = parse("$var wire 1 ! loose $end $enddefinitions $end #0 1!").unwrap();
        assert_eq!(trace.root_scope().child_signals().len(), 1);
        assert_eq!(trace.signals()[0].path(), &["loose".to_string()]);
    }

    #[test]
    fn scope_left_open() {
        let err = parse("$scope module a $end").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Grammar);
        assert!(err.message().contains("`a`"));

        let err = parse("$scope module a $end $enddefinitions $end").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Grammar);
    }

    #[test]
    fn declarations_required() {
        let err = parse("$timescale 1ps $end $enddefinitions $end").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Grammar);
    }

    #[test]
    fn value_change_before_enddefinitions() {
        let err = parse("$scope module a $end $var wire 1 ! x $end 1! $upscope $end").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Grammar);
    }
}
