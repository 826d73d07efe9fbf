//! Seven-segment display capability

use crate::segments::{digit_codes, float_codes};

/// Digits on one display unit
pub const DIGITS_PER_UNIT: usize = 4;

/// Number base used for digit conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Radix {
    #[default]
    Decimal,
    Hex,
}

impl Radix {
    /// Numeric base
    pub const fn base(self) -> i32 {
        match self {
            Radix::Decimal => 10,
            Radix::Hex => 16,
        }
    }
}

/// Trait for displays made of 4-digit seven-segment units
///
/// Codes use bit 0..6 for segments A..G and bit 7 for the decimal point.
/// Calls naming a unit that does not exist are ignored, and reading one
/// returns blank codes.
pub trait SegmentDisplay {
    /// Number of units
    fn unit_count(&self) -> usize;

    /// Replace all four digit codes
    fn set_segments(&mut self, unit: usize, codes: [u8; DIGITS_PER_UNIT]);

    /// Current digit codes
    fn segments(&self, unit: usize) -> [u8; DIGITS_PER_UNIT];

    /// Show an integer, right-aligned
    ///
    /// See [`digit_codes`] for the layout and `point` semantics.
    fn set_number(&mut self, unit: usize, value: i32, point: Option<u8>, radix: Radix) {
        self.set_segments(unit, digit_codes(value, point, radix));
    }

    /// Show a float rounded half away from zero to `dec_places` decimals
    fn set_number_f(&mut self, unit: usize, value: f32, dec_places: u8) {
        self.set_segments(unit, float_codes(value, dec_places));
    }

    /// Replace the code of a single digit
    fn set_digit(&mut self, unit: usize, digit: usize, code: u8) {
        if digit < DIGITS_PER_UNIT {
            let mut codes = self.segments(unit);
            codes[digit] = code;
            self.set_segments(unit, codes);
        }
    }
}
