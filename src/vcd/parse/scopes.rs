// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.

//! `$scope`, `$var` and `$upscope`: the part of the grammar that builds
//! the scope tree and declares its signals.
use std::io::BufRead;

use super::super::error::{ParseError, Result};
use super::super::reader::Cursor;
use super::super::signal::{BitRange, SignalType};
use super::super::tokenizer::{Keyword, Token, Tokenizer};
use super::super::types::ScopeKind;

use super::actions::ParseState;
use super::combinator_atoms::{ident, next_token, tag, take_until, word};
use super::types::ParseResult;

pub(super) fn parse_var<R: BufRead>(
    tokens: &mut Tokenizer<R>,
    state: &mut ParseState,
) -> Result<()> {
    let context = "`$var`";

    // $var parameter 3 a IDLE $end
    //      ^^^^^^^^^ - var_type
    let (type_word, cursor) = word(tokens, context, "a variable type")?;
    let var_type = SignalType::from_word(&type_word).ok_or_else(|| {
        ParseError::grammar(
            cursor,
            format!(
                "found `{type_word}` but expected one of {:?}",
                SignalType::KEYWORDS
            ),
        )
    })?;

    // $var parameter 3 a IDLE $end
    //                ^ - num_bits
    let (width_word, cursor) = word(tokens, context, "a bit width")?;
    let num_bits = width_word.parse::<u32>().map_err(|_| {
        ParseError::grammar(
            cursor,
            format!("`{width_word}` is not a valid bit width"),
        )
    })?;

    // $var parameter 3 a IDLE $end
    //                  ^ - signal_alias
    let (identifier, _) = word(tokens, context, "an identifier")?;

    // $var parameter 3 a IDLE $end
    //                    ^^^^ - full_signal_name(can extend until $end)
    let mut full_signal_name = Vec::<String>::new();
    let mut index = None;
    loop {
        match next_token(tokens, context)? {
            (Token::Keyword(Keyword::End), _) => break,
            (Token::Word(word), cursor) => {
                if tag(&word, "[").assert_match().is_ok() {
                    index = Some(bit_range(&word, cursor)?);
                    continue;
                }

                // `data[7:0]` written without a space
                let ParseResult { matched, residual } = take_until(&word, b'[');
                match BitRange::parse(residual) {
                    Some(range) if !matched.is_empty() => {
                        index = Some(range);
                        full_signal_name.push(matched.to_string());
                    }
                    _ => full_signal_name.push(word),
                }
            }
            (other, cursor) => {
                return Err(ParseError::grammar(
                    cursor,
                    format!("found {} in `$var` but expected a reference or `$end`", other.describe()),
                ))
            }
        }
    }

    if full_signal_name.is_empty() {
        return Err(ParseError::grammar(
            tokens.cursor(),
            format!("`$var` for identifier `{identifier}` has no reference name"),
        ));
    }
    let full_signal_name = full_signal_name.join(" ");

    state.declare_signal(var_type, num_bits, identifier, full_signal_name, index);
    Ok(())
}

fn bit_range(word: &str, cursor: Cursor) -> Result<BitRange> {
    BitRange::parse(word).ok_or_else(|| {
        ParseError::grammar(cursor, format!("`{word}` is not a valid bit range"))
    })
}

pub(super) fn parse_scope<R: BufRead>(
    tokens: &mut Tokenizer<R>,
    state: &mut ParseState,
) -> Result<()> {
    let context = "`$scope`";

    // $scope module reg_mag_i $end
    //        ^^^^^^ - module keyword
    let (keyword, cursor) = word(tokens, context, "a scope kind")?;
    let kind = ScopeKind::from_word(&keyword).ok_or_else(|| {
        ParseError::grammar(
            cursor,
            format!(
                "found keyword `{keyword}` but expected one of {:?}",
                ScopeKind::KEYWORDS
            ),
        )
    })?;

    // $scope module reg_mag_i $end
    //               ^^^^^^^^^ - scope name
    // Some tools emit scopes without names; those are kept with an empty name.
    let name = match next_token(tokens, context)? {
        (Token::Word(name), _) => {
            ident(tokens, Keyword::End, context)?;
            name
        }
        (Token::Keyword(Keyword::End), _) => String::new(),
        (other, cursor) => {
            return Err(ParseError::grammar(
                cursor,
                format!("found {} but expected a scope name", other.describe()),
            ))
        }
    };

    state.open_scope(kind, name);
    Ok(())
}

pub(super) fn parse_upscope<R: BufRead>(
    tokens: &mut Tokenizer<R>,
    state: &mut ParseState,
    cursor: Cursor,
) -> Result<()> {
    if state.close_scope().is_none() {
        return Err(ParseError::grammar(
            cursor,
            "`$upscope` without a matching `$scope`",
        ));
    }
    ident(tokens, Keyword::End, "`$upscope`")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcd::error::ErrorKind;
    use crate::vcd::types::Trace;

    // Drives the declaration keywords by hand so these tests stay independent
    // of the top level grammar.
    fn declare(src: &str) -> Result<Trace> {
        let mut tokens = Tokenizer::new(src.as_bytes(), false);
        let mut state = ParseState::new();
        state.begin(0, u64::MAX, false);
        while let Some((token, cursor)) = tokens.next_token()? {
            match token {
                Token::Keyword(Keyword::Scope) => parse_scope(&mut tokens, &mut state)?,
                Token::Keyword(Keyword::Var) => parse_var(&mut tokens, &mut state)?,
                Token::Keyword(Keyword::Upscope) => parse_upscope(&mut tokens, &mut state, cursor)?,
                other => panic!("unexpected {other:?}"),
            }
        }
        Ok(state.finish())
    }

    #[test]
    fn nested_scopes_and_vars() {
        let trace = declare(
            "$scope module top $end
               $var wire 1 ! clk $end
               $scope task cpu $end
                 $var reg 8 \" data [7:0] $end
                 $var integer 32 # count $end
               $upscope $end
             $upscope $end",
        )
        .unwrap();

        assert_eq!(trace.scopes().len(), 3);
        let top = trace.child_scopes(trace.root_scope().self_idx()).next().unwrap();
        assert_eq!((top.name(), top.kind()), ("top", ScopeKind::Module));
        let cpu = trace.child_scopes(top.self_idx()).next().unwrap();
        assert_eq!(cpu.kind(), ScopeKind::Task);

        let data = trace.signal_by_path("top.cpu.data").unwrap();
        assert_eq!(data.num_bits(), 8);
        assert_eq!(data.index(), Some(BitRange::Range { msb: 7, lsb: 0 }));
        assert_eq!(data.signal_type(), SignalType::Reg);
        assert_eq!(data.scope_parent(), cpu.self_idx());
        assert_eq!(trace.child_signals(cpu.self_idx()).count(), 2);
    }

    #[test]
    fn glued_ranges_and_multi_word_names() {
        let trace = declare(
            "$scope module top $end
               $var wire 4 ! bus[3:0] $end
               $var wire 1 \" bus [4] $end
               $var wire 1 # a b $end
             $upscope $end",
        )
        .unwrap();

        let signals = trace.signals();
        assert_eq!(signals[0].name(), "bus");
        assert_eq!(signals[0].index(), Some(BitRange::Range { msb: 3, lsb: 0 }));
        assert_eq!(signals[1].index(), Some(BitRange::Single(4)));
        assert_eq!(signals[2].name(), "a b");
    }

    #[test]
    fn nameless_scope_is_left_out_of_paths() {
        let trace = declare(
            "$scope module a $end
               $scope module $end
                 $var wire 1 ! x $end
               $upscope $end
             $upscope $end",
        )
        .unwrap();

        assert_eq!(trace.scopes().len(), 3);
        assert!(trace.signal_by_path("a.x").is_some());
    }

    #[test]
    fn unmatched_upscope() {
        let err = declare("$scope module a $end $upscope $end $upscope $end").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Grammar);
        assert_eq!(err.location().unwrap().column, 36);
    }

    #[test]
    fn bad_declarations() {
        for src in [
            "$scope modul a $end",
            "$scope module a b $end",
            "$var wyre 1 ! a $end",
            "$var wire one ! a $end",
            "$var wire 1 ! $end",
            "$var wire 1 ! a [x:0] $end",
            "$var wire 1 ! a",
        ] {
            let err = declare(src).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Grammar, "{src}");
        }
    }
}
