use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use super::error::{Location, ParseError, Result};
use super::parse::{parse_trace, ParseState};
use super::tokenizer::Tokenizer;
use super::types::Trace;

/// Settings a session reads at the start of every parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Time steps before this time are not kept.
    pub start_time: u64,
    /// Time steps after this time are not kept.
    pub end_time: u64,
    /// Log every token at `trace` level under the `vcd::scan` target.
    pub trace_scanning: bool,
    /// Log every semantic action at `debug` level under the `vcd::parse` target.
    pub trace_parsing: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            start_time: 0,
            end_time: u64::MAX,
            trace_scanning: false,
            trace_parsing: false,
        }
    }
}

/// Receives every parse failure as a location and a message. The location
/// is `None` when the input could not be opened at all.
pub type DiagnosticSink = Box<dyn FnMut(Option<Location>, &str) + Send>;

fn log_diagnostic(location: Option<Location>, message: &str) {
    match location {
        Some(location) => tracing::error!(target: "vcd::session", %location, "{message}"),
        None => tracing::error!(target: "vcd::session", "{message}"),
    }
}

/// One parser session. It owns all mutable state of a parse, so separate
/// sessions can run on separate threads without sharing anything, and one
/// session can be reused for any number of sequential parses.
pub struct VcdParser {
    options: ParseOptions,
    sink: DiagnosticSink,
    state: ParseState,
}

impl Default for VcdParser {
    fn default() -> Self {
        Self::new()
    }
}

impl VcdParser {
    pub fn new() -> VcdParser {
        VcdParser::with_options(ParseOptions::default())
    }

    pub fn with_options(options: ParseOptions) -> VcdParser {
        VcdParser {
            options,
            sink: Box::new(log_diagnostic),
            state: ParseState::new(),
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ParseOptions {
        &mut self.options
    }

    /// Replaces the default sink, which logs through `tracing`.
    pub fn set_diagnostic_sink(
        &mut self,
        sink: impl FnMut(Option<Location>, &str) + Send + 'static,
    ) {
        self.sink = Box::new(sink);
    }

    /// Parses the file at `path`. An empty path or `-` reads standard input.
    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Trace> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() || path == Path::new("-") {
            return self.parse_buffered(io::stdin().lock());
        }

        tracing::debug!(target: "vcd::session", path = %path.display(), "parsing file");
        match File::open(path) {
            Ok(file) => self.parse_buffered(BufReader::new(file)),
            Err(err) => Err(self.report(ParseError::open(path, err))),
        }
    }

    /// Parses a dump from any reader, which is dropped before this returns.
    pub fn parse_reader<R: Read>(&mut self, reader: R) -> Result<Trace> {
        self.parse_buffered(BufReader::new(reader))
    }

    fn parse_buffered<R: BufRead>(&mut self, input: R) -> Result<Trace> {
        let ParseOptions {
            start_time,
            end_time,
            trace_scanning,
            trace_parsing,
        } = self.options;

        self.state.begin(start_time, end_time, trace_parsing);

        // the tokenizer owns the input, so leaving this block releases it on
        // every path
        let outcome = {
            let mut tokens = Tokenizer::new(input, trace_scanning);
            parse_trace(&mut tokens, &mut self.state)
        };

        match outcome {
            Ok(()) => {
                let trace = self.state.finish();
                tracing::debug!(
                    target: "vcd::session",
                    signals = trace.signals().len(),
                    time_steps = trace.time_steps().len(),
                    "parse complete"
                );
                Ok(trace)
            }
            Err(err) => {
                self.state.abandon();
                Err(self.report(err))
            }
        }
    }

    fn report(&mut self, err: ParseError) -> ParseError {
        (self.sink)(err.location(), err.message());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcd::error::ErrorKind;
    use std::sync::{Arc, Mutex};

    const SMALL: &str = "$scope module top $end $var wire 1 ! a $end $upscope $end \
                         $enddefinitions $end #0 0! #5 1!";

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Send + Sync>() {}

    #[test]
    fn sessions_and_traces_cross_threads() {
        assert_send::<VcdParser>();
        assert_sync::<Trace>();
    }

    #[test]
    fn sink_receives_location_and_message() {
        let seen = Arc::new(Mutex::new(vec![]));
        let mut parser = VcdParser::new();
        let sink_seen = Arc::clone(&seen);
        parser.set_diagnostic_sink(move |location, message| {
            sink_seen.lock().unwrap().push((location, message.to_string()));
        });

        let err = parser.parse_reader("$upscope $end".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Grammar);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, Some(Location { line: 1, column: 1 }));
        assert_eq!(seen[0].1, err.message());
    }

    #[test]
    fn failure_then_success_on_one_session() {
        let mut parser = VcdParser::new();
        parser.set_diagnostic_sink(|_, _| {});

        assert!(parser.parse_reader("$scope module a $end".as_bytes()).is_err());
        let reused = parser.parse_reader(SMALL.as_bytes()).unwrap();
        let fresh = VcdParser::new().parse_reader(SMALL.as_bytes()).unwrap();
        assert_eq!(reused, fresh);
    }

    #[test]
    fn options_bound_retained_steps() {
        let mut parser = VcdParser::with_options(ParseOptions {
            start_time: 1,
            ..ParseOptions::default()
        });
        let trace = parser.parse_reader(SMALL.as_bytes()).unwrap();
        assert_eq!(trace.time_steps().len(), 1);
        assert_eq!(trace.time_steps()[0].time, 5);

        parser.options_mut().start_time = 0;
        let trace = parser.parse_reader(SMALL.as_bytes()).unwrap();
        assert_eq!(trace.time_steps().len(), 2);
    }

    #[test]
    fn debug_toggles_do_not_change_results() {
        let mut quiet = VcdParser::new();
        let mut chatty = VcdParser::with_options(ParseOptions {
            trace_scanning: true,
            trace_parsing: true,
            ..ParseOptions::default()
        });
        assert_eq!(
            quiet.parse_reader(SMALL.as_bytes()).unwrap(),
            chatty.parse_reader(SMALL.as_bytes()).unwrap()
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut parser = VcdParser::new();
        let err = parser.parse_file("does/not/exist.vcd").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.location().is_none());
    }
}
