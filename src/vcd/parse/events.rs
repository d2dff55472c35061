use std::io::BufRead;

use super::super::error::{ParseError, Result};
use super::super::reader::Cursor;
use super::super::signal::{BitVector, Value};
use super::super::tokenizer::{Keyword, Radix, Token, Tokenizer};
use super::super::utilities::digits_to_bits;

use super::actions::ParseState;
use super::combinator_atoms::text_body;

/// Decodes a vector payload. The declared width is not enforced: the value
/// keeps exactly the bits the dump spelled out.
fn decode_vector(radix: Radix, digits: String, cursor: Cursor) -> Result<Value> {
    match radix {
        Radix::Real => digits.parse::<f64>().map(Value::Real).map_err(|_| {
            ParseError::lexical(cursor, format!("`r{digits}` is not a valid real value"))
        }),
        Radix::String => Ok(Value::String(digits)),
        _ => digits_to_bits(radix, &digits)
            .map(|bits| Value::Vector(BitVector(bits)))
            .map_err(|err| {
                ParseError::lexical(
                    cursor,
                    format!("`{}{digits}`: {err}", radix.marker()),
                )
            }),
    }
}

/// Width of `value` in bits, when it has one.
fn payload_width(value: &Value) -> Option<usize> {
    match value {
        Value::Scalar(_) => Some(1),
        Value::Vector(bits) => Some(bits.len()),
        Value::Real(_) | Value::String(_) => None,
    }
}

fn record(state: &mut ParseState, identifier: String, value: Value, cursor: Cursor) -> Result<()> {
    let mut signals = state
        .resolve(&identifier)
        .ok_or_else(|| ParseError::unknown_identifier(cursor, &identifier))?;

    // all aliases share one value stream, so the first declaration speaks
    // for the rest
    if let (Some(signal), Some(width)) = (signals.next(), payload_width(&value)) {
        let declared = signal.num_bits() as usize;
        if width > declared {
            tracing::debug!(
                target: "vcd::parse",
                %identifier,
                declared,
                width,
                "value wider than its declaration"
            );
        }
        if signal.signal_type().is_real() {
            tracing::debug!(target: "vcd::parse", %identifier, "bit value for a real signal");
        }
    }
    drop(signals);

    state.record_change(&identifier, value);
    Ok(())
}

/// Everything after `$enddefinitions $end`: timestamps, value changes, the
/// `$dump*` blocks that group them, and comments.
pub(super) fn parse_events<R: BufRead>(
    tokens: &mut Tokenizer<R>,
    state: &mut ParseState,
) -> Result<()> {
    // the `$dump*` block currently open, if any
    let mut dump_block: Option<Keyword> = None;

    while let Some((token, cursor)) = tokens.next_token()? {
        match token {
            Token::Timestamp(time) => {
                if !state.advance_time(time) {
                    return Err(ParseError::grammar(
                        cursor,
                        format!(
                            "timestamp `#{time}` goes back in time from `#{}`",
                            state.current_time()
                        ),
                    ));
                }
            }
            Token::ScalarChange { bit, identifier } => {
                record(state, identifier, Value::Scalar(bit), cursor)?;
            }
            Token::VectorChange {
                radix,
                digits,
                identifier,
            } => {
                let value = decode_vector(radix, digits, cursor)?;
                record(state, identifier, value, cursor)?;
            }
            Token::Keyword(
                keyword @ (Keyword::DumpVars | Keyword::DumpAll | Keyword::DumpOn | Keyword::DumpOff),
            ) => {
                if let Some(open) = dump_block {
                    return Err(ParseError::grammar(
                        cursor,
                        format!(
                            "`{}` inside an unterminated `{}` block",
                            keyword.as_str(),
                            open.as_str()
                        ),
                    ));
                }
                dump_block = Some(keyword);
            }
            Token::Keyword(Keyword::End) if dump_block.is_some() => dump_block = None,
            Token::Keyword(Keyword::Comment) => {
                let words = text_body(tokens, "`$comment`")?;
                state.metadata_mut().comments.push(words.join(" "));
            }
            other => {
                return Err(ParseError::grammar(
                    cursor,
                    format!("found {} after `$enddefinitions`", other.describe()),
                ))
            }
        }
    }

    if let Some(open) = dump_block {
        return Err(ParseError::grammar(
            tokens.cursor(),
            format!("unexpected end of input in `{}` block", open.as_str()),
        ));
    }

    Ok(())
}
