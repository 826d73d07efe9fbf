//! Segment codes
//!
//! ```text
//!      AAA
//!     F   B
//!     F   B
//!      GGG
//!     E   C
//!     E   C
//!      DDD   P
//! ```
//!
//! Bit 0 is segment A, bit 6 is G, bit 7 is the decimal point (P).

/// All segments off
pub const BLANK: u8 = 0b0000_0000;
/// Middle bar, used for the sign and for out-of-range values
pub const DASH: u8 = 0b0100_0000;
/// Decimal point
pub const POINT: u8 = 0b1000_0000;
/// Lower-case `c`, the temperature unit marker
pub const CELSIUS: u8 = 0b0101_1000;

/// Codes for digits 0..=15
const HEX_DIGITS: [u8; 16] = [
    0b0011_1111, // 0
    0b0000_0110, // 1
    0b0101_1011, // 2
    0b0100_1111, // 3
    0b0110_0110, // 4
    0b0110_1101, // 5
    0b0111_1101, // 6
    0b0000_0111, // 7
    0b0111_1111, // 8
    0b0110_1111, // 9
    0b0111_0111, // A
    0b0111_1100, // b
    0b0011_1001, // C
    0b0101_1110, // d
    0b0111_1001, // E
    0b0111_0001, // F
];

/// Code for a digit value, or `None` above 15
pub const fn glyph_for_digit(digit: u8) -> Option<u8> {
    if (digit as usize) < HEX_DIGITS.len() {
        Some(HEX_DIGITS[digit as usize])
    } else {
        None
    }
}
