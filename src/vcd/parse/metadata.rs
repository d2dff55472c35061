use std::io::BufRead;

use chrono::prelude::*;
use itertools::Itertools;

use super::super::error;
use super::super::tokenizer::{Keyword, Tokenizer};
use super::super::types::{Timescale, Version};
use super::actions::ParseState;
use super::combinator_atoms::{digit, take_while, text_body};
use super::types::ParseResult;

/// Interprets the five words of a typical `$date` body, e.g.
/// `Mon Feb 22 19:49:29 2021`. Simulators disagree on the order of the
/// words, so every ordering is tried.
pub(super) fn parse_date(words: &[String]) -> Option<DateTime<Utc>> {
    if words.len() != 5 {
        return None;
    }

    words
        .iter()
        .permutations(words.len())
        .find_map(|permutation| {
            let candidate = permutation.into_iter().join(" ");
            NaiveDateTime::parse_from_str(&candidate, "%a %b %e %T %Y").ok()
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_unit(unit: &str) -> Result<Timescale, String> {
    match unit {
        "fs" => Ok(Timescale::Fs),
        "ps" => Ok(Timescale::Ps),
        "ns" => Ok(Timescale::Ns),
        "us" => Ok(Timescale::Us),
        "ms" => Ok(Timescale::Ms),
        "s" => Ok(Timescale::S),
        _ => Err(format!("unknown time unit `{unit}`")),
    }
}

/// We might see `1ps` or `1 ps`.
pub(super) fn parse_timescale(words: &[String]) -> Result<(u32, Timescale), String> {
    let text = words.concat();
    let parsed = take_while(&text, digit);

    let scalar: u32 = parsed
        .assert_match()
        .map_err(|_| format!("timescale `{text}` does not start with a number"))?
        .parse()
        .map_err(|err| format!("timescale `{text}`: {err}"))?;

    let ParseResult { residual, .. } = parsed;
    let unit = parse_unit(residual)?;

    Ok((scalar, unit))
}

/// Consumes the body of a `$date`, `$version`, `$timescale` or `$comment`
/// whose keyword was just read, and files it in the trace metadata.
pub(super) fn parse_header_item<R: BufRead>(
    keyword: Keyword,
    tokens: &mut Tokenizer<R>,
    state: &mut ParseState,
) -> error::Result<()> {
    let context = format!("`{}`", keyword.as_str());
    let words = text_body(tokens, &context)?;
    let text = words.join(" ");
    let metadata = state.metadata_mut();

    match keyword {
        Keyword::Date => {
            metadata.parsed_date = parse_date(&words);
            if metadata.parsed_date.is_none() {
                tracing::debug!(target: "vcd::parse", date = %text, "date kept as text only");
            }
            metadata.date = Some(text);
        }
        Keyword::Version => metadata.version = Some(Version(text)),
        Keyword::Timescale => {
            metadata.parsed_timescale = match parse_timescale(&words) {
                Ok(timescale) => Some(timescale),
                Err(msg) => {
                    tracing::debug!(target: "vcd::parse", "{msg}");
                    None
                }
            };
            metadata.timescale = Some(text);
        }
        _ => metadata.comments.push(text),
    }

    Ok(())
}
