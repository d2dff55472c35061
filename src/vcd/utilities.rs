use num::{BigUint, Num};

use super::signal::Bit;
use super::tokenizer::Radix;
use super::types::TimeStep;

#[derive(Debug, PartialEq)]
pub(crate) enum DigitErr {
    Empty,
    OtherValue(char),
    NotDecimal(String),
}

impl std::fmt::Display for DigitErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DigitErr::Empty => write!(f, "vector value has no digits"),
            DigitErr::OtherValue(chr) => write!(f, "`{chr}` is not a valid digit"),
            DigitErr::NotDecimal(digits) => write!(f, "`{digits}` is not a decimal number"),
        }
    }
}

// Expands one octal or hex digit into `width` bits, msb first. An `x` or `z`
// digit smears across every bit it stands for.
fn push_digit_bits(bits: &mut Vec<Bit>, chr: u8, width: u32, radix: u32) -> Result<(), DigitErr> {
    if let Some(bit) = Bit::from_char(chr).filter(|bit| matches!(bit, Bit::X | Bit::Z)) {
        bits.extend(std::iter::repeat(bit).take(width as usize));
        return Ok(());
    }

    let val = (chr as char)
        .to_digit(radix)
        .ok_or(DigitErr::OtherValue(chr as char))?;
    for shift in (0..width).rev() {
        bits.push(if (val >> shift) & 1 == 1 { Bit::One } else { Bit::Zero });
    }
    Ok(())
}

/// Decodes the digits of a binary, octal, hex or decimal payload into bits,
/// msb first. No width is imposed: the result holds exactly what the digits
/// spell.
pub(crate) fn digits_to_bits(radix: Radix, digits: &str) -> Result<Vec<Bit>, DigitErr> {
    if digits.is_empty() {
        return Err(DigitErr::Empty);
    }

    let mut bits = Vec::with_capacity(digits.len());
    match radix {
        Radix::Binary => {
            for chr in digits.bytes() {
                bits.push(Bit::from_char(chr).ok_or(DigitErr::OtherValue(chr as char))?);
            }
        }
        Radix::Octal => {
            for chr in digits.bytes() {
                push_digit_bits(&mut bits, chr, 3, 8)?;
            }
        }
        Radix::Hex => {
            for chr in digits.bytes() {
                push_digit_bits(&mut bits, chr, 4, 16)?;
            }
        }
        Radix::Decimal => {
            // a decimal payload is either a number or a lone unknown state
            if let [chr] = digits.as_bytes() {
                if let Some(bit @ (Bit::X | Bit::Z)) = Bit::from_char(*chr) {
                    return Ok(vec![bit]);
                }
            }
            let value = BigUint::from_str_radix(digits, 10)
                .map_err(|_| DigitErr::NotDecimal(digits.to_string()))?;
            let binary = value.to_str_radix(2);
            for chr in binary.bytes() {
                bits.push(if chr == b'1' { Bit::One } else { Bit::Zero });
            }
        }
        Radix::Real | Radix::String => {
            return Err(DigitErr::OtherValue(radix.marker()));
        }
    }
    Ok(bits)
}

/// Packs msb-first bits into little endian bytes. Returns `None` when a bit
/// is `x` or `z`, since such a vector has no numeric value.
pub(crate) fn bits_to_le_bytes(bits: &[Bit]) -> Option<Vec<u8>> {
    let mut bytes = Vec::with_capacity(bits.len() / 8 + 1);

    // walk 8 bit chunks from the least significant end
    for chunk in bits.rchunks(8) {
        let mut val = 0u8;
        for (idx, bit) in chunk.iter().rev().enumerate() {
            match bit {
                Bit::One => val |= 1 << idx,
                Bit::Zero => {}
                Bit::X | Bit::Z => return None,
            }
        }
        bytes.push(val);
    }
    Some(bytes)
}

/// Index of the last step at or before `desired_time`, or `None` when the
/// timeline starts after it.
pub(crate) fn ordered_step_lookup(steps: &[TimeStep], desired_time: u64) -> Option<usize> {
    let after = steps.partition_point(|step| step.time <= desired_time);
    after.checked_sub(1)
}
