// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.
use std::io::Read;

mod vcd;
pub use vcd::error::{ErrorKind, Location, ParseError, Result};
pub use vcd::session::{DiagnosticSink, ParseOptions, VcdParser};
pub use vcd::signal::{Bit, BitRange, BitVector, Signal, SignalType, Value};
pub use vcd::types::{Metadata, Timescale, Version};
pub use vcd::types::{Scope, ScopeIdx, ScopeKind, SignalIdx, TimeStep, Trace, ValueChange};

pub use num::BigUint;

/// Parses a whole dump from `reader` with a throwaway session and the
/// default options.
pub fn parse_vcd<R: Read>(reader: R) -> Result<Trace> {
    VcdParser::new().parse_reader(reader)
}
