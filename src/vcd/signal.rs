use std::fmt;

use num::BigUint;

use super::types::{ScopeIdx, SignalIdx};
use super::utilities::bits_to_le_bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalType {
    Event,
    Integer,
    Parameter,
    Real,
    RealTime,
    Reg,
    Str,
    Supply0,
    Supply1,
    Time,
    Tri,
    TriAnd,
    TriOr,
    TriReg,
    Tri0,
    Tri1,
    WAnd,
    Wire,
    WOr,
    SVInt,
    SVShortInt,
    SVLongInt,
    SVLogic,
    SVBit,
    SVChar,
    SVShortReal,
}

impl SignalType {
    pub(crate) const KEYWORDS: [&'static str; 30] = [
        "event",
        "integer",
        "parameter",
        "real",
        "realtime",
        "reg",
        "string",
        "supply0",
        "supply1",
        "time",
        "tri",
        "triand",
        "trior",
        "trireg",
        "tri0",
        "tri1",
        "wand",
        "wire",
        "wor",
        "int",
        "int_s",
        "shortint",
        "int_l",
        "longint",
        "char",
        "byte",
        "logic",
        "bit",
        "shortreal",
        "real_parameter",
    ];

    pub(crate) fn from_word(word: &str) -> Option<SignalType> {
        let signal_type = match word {
            "event" => SignalType::Event,
            "integer" => SignalType::Integer,
            "parameter" => SignalType::Parameter,
            "real" | "real_parameter" => SignalType::Real,
            "realtime" => SignalType::RealTime,
            "reg" => SignalType::Reg,
            "string" => SignalType::Str,
            "supply0" => SignalType::Supply0,
            "supply1" => SignalType::Supply1,
            "time" => SignalType::Time,
            "tri" => SignalType::Tri,
            "triand" => SignalType::TriAnd,
            "trior" => SignalType::TriOr,
            "trireg" => SignalType::TriReg,
            "tri0" => SignalType::Tri0,
            "tri1" => SignalType::Tri1,
            "wand" => SignalType::WAnd,
            "wire" => SignalType::Wire,
            "wor" => SignalType::WOr,
            "int" => SignalType::SVInt,
            "int_s" | "shortint" => SignalType::SVShortInt,
            "int_l" | "longint" => SignalType::SVLongInt,
            "logic" => SignalType::SVLogic,
            "bit" => SignalType::SVBit,
            "byte" | "char" => SignalType::SVChar,
            "shortreal" => SignalType::SVShortReal,
            _ => return None,
        };
        Some(signal_type)
    }

    /// Real-valued signals carry `r` payloads rather than bit vectors.
    pub fn is_real(&self) -> bool {
        matches!(
            self,
            SignalType::Real | SignalType::RealTime | SignalType::SVShortReal
        )
    }
}

/// One of the four states a bit may take in a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bit {
    Zero,
    One,
    X,
    Z,
}

impl Bit {
    pub(crate) fn from_char(chr: u8) -> Option<Bit> {
        match chr {
            b'0' => Some(Bit::Zero),
            b'1' => Some(Bit::One),
            b'x' | b'X' => Some(Bit::X),
            b'z' | b'Z' => Some(Bit::Z),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Bit::Zero => '0',
            Bit::One => '1',
            Bit::X => 'x',
            Bit::Z => 'z',
        }
    }
}

/// Bits of a vector value, most significant first, exactly as many as the
/// dump provided.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitVector(pub(crate) Vec<Bit>);

impl BitVector {
    pub fn bits(&self) -> &[Bit] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Numeric value of the vector, or `None` if any bit is `x` or `z`.
    pub fn to_biguint(&self) -> Option<BigUint> {
        bits_to_le_bytes(&self.0).map(|bytes| BigUint::from_bytes_le(&bytes))
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.0 {
            write!(f, "{}", bit.as_char())?;
        }
        Ok(())
    }
}

/// A decoded value-change payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Bit),
    Vector(BitVector),
    Real(f64),
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(bit) => write!(f, "{}", bit.as_char()),
            Value::Vector(bits) => write!(f, "b{bits}"),
            Value::Real(real) => write!(f, "r{real}"),
            Value::String(string) => write!(f, "s{string}"),
        }
    }
}

/// The `[msb:lsb]` or `[idx]` suffix of a `$var` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitRange {
    Single(i64),
    Range { msb: i64, lsb: i64 },
}

impl BitRange {
    pub(crate) fn parse(text: &str) -> Option<BitRange> {
        let inner = text.strip_prefix('[')?.strip_suffix(']')?;
        match inner.split_once(':') {
            Some((msb, lsb)) => Some(BitRange::Range {
                msb: msb.trim().parse().ok()?,
                lsb: lsb.trim().parse().ok()?,
            }),
            None => Some(BitRange::Single(inner.trim().parse().ok()?)),
        }
    }
}

impl fmt::Display for BitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitRange::Single(idx) => write!(f, "[{idx}]"),
            BitRange::Range { msb, lsb } => write!(f, "[{msb}:{lsb}]"),
        }
    }
}

/// A declared variable. Several signals may share one identifier, in which
/// case all of them follow the same value stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub(crate) name: String,
    pub(crate) path: Vec<String>,
    pub(crate) signal_type: SignalType,
    pub(crate) num_bits: u32,
    pub(crate) index: Option<BitRange>,
    pub(crate) identifier: String,
    pub(crate) self_idx: SignalIdx,
    pub(crate) scope_parent: ScopeIdx,
}

impl Signal {
    /// Reference name as written in the declaration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the enclosing scopes followed by the signal name.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn signal_type(&self) -> SignalType {
        self.signal_type
    }

    pub fn num_bits(&self) -> u32 {
        self.num_bits
    }

    pub fn index(&self) -> Option<BitRange> {
        self.index
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn self_idx(&self) -> SignalIdx {
        self.self_idx
    }

    pub fn scope_parent(&self) -> ScopeIdx {
        self.scope_parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_ranges() {
        assert_eq!(
            BitRange::parse("[7:0]"),
            Some(BitRange::Range { msb: 7, lsb: 0 })
        );
        assert_eq!(BitRange::parse("[3]"), Some(BitRange::Single(3)));
        assert_eq!(
            BitRange::parse("[0:-4]"),
            Some(BitRange::Range { msb: 0, lsb: -4 })
        );
        assert_eq!(BitRange::parse("[a:0]"), None);
        assert_eq!(BitRange::parse("7:0"), None);
        assert_eq!(BitRange::Range { msb: 7, lsb: 0 }.to_string(), "[7:0]");
    }

    #[test]
    fn vector_numeric_value() {
        let bits = BitVector(vec![Bit::One, Bit::Zero, Bit::One, Bit::One]);
        assert_eq!(bits.to_biguint(), Some(BigUint::from(11u32)));
        assert_eq!(bits.to_string(), "1011");

        let unknown = BitVector(vec![Bit::One, Bit::X]);
        assert_eq!(unknown.to_biguint(), None);
    }

    #[test]
    fn every_type_keyword_is_known() {
        for word in SignalType::KEYWORDS {
            assert!(SignalType::from_word(word).is_some(), "{word}");
        }
        assert!(SignalType::from_word("wires").is_none());
        assert!(SignalType::Real.is_real());
        assert!(!SignalType::Wire.is_real());
    }
}
