//! Number to digit-code conversion

use super::glyph::{glyph_for_digit, BLANK, DASH, POINT};
use crate::traits::display::{Radix, DIGITS_PER_UNIT};

/// Shown when a value does not fit in four digits
pub const OVERFLOW: [u8; DIGITS_PER_UNIT] = [DASH; DIGITS_PER_UNIT];

/// Lay out an integer over four digits, right-aligned
///
/// Negative values take a leading dash, leaving three digits for the
/// magnitude. Values outside `-(base³-1) ..= base⁴-1` give [`OVERFLOW`].
///
/// `point` is a position in `1..=4`: the decimal point is OR'ed onto digit
/// `point - 1` and leading zeros are blanked only to the left of that digit.
/// Without a point the last digit is never blanked. Other positions are
/// ignored.
pub fn digit_codes(value: i32, point: Option<u8>, radix: Radix) -> [u8; DIGITS_PER_UNIT] {
    let base = radix.base();
    let max = base.pow(DIGITS_PER_UNIT as u32) - 1;
    let min = -(base.pow(DIGITS_PER_UNIT as u32 - 1) - 1);
    if value > max || value < min {
        return OVERFLOW;
    }

    let mut codes = [BLANK; DIGITS_PER_UNIT];
    let mut first = 0;
    if value < 0 {
        codes[0] = DASH;
        first = 1;
    }

    let mut digits = [0u8; DIGITS_PER_UNIT];
    let mut rest = value.abs();
    for pos in (first..DIGITS_PER_UNIT).rev() {
        digits[pos] = (rest % base) as u8;
        rest /= base;
    }

    let point_digit = point
        .filter(|p| (1..=DIGITS_PER_UNIT as u8).contains(p))
        .map(|p| p as usize - 1);
    let blank_end = point_digit.unwrap_or(DIGITS_PER_UNIT - 1);

    let mut leading = true;
    for pos in first..DIGITS_PER_UNIT {
        if leading && pos < blank_end && digits[pos] == 0 {
            continue;
        }
        leading = false;
        codes[pos] = glyph_for_digit(digits[pos]).unwrap_or(DASH);
    }

    if let Some(pos) = point_digit {
        codes[pos] |= POINT;
    }
    codes
}

/// Lay out a float with `dec_places` decimals (at most 3)
///
/// The value is scaled, rounded half away from zero and passed to
/// [`digit_codes`] with the point placed before the last `dec_places`
/// digits. Non-finite values give [`OVERFLOW`].
pub fn float_codes(value: f32, dec_places: u8) -> [u8; DIGITS_PER_UNIT] {
    if !value.is_finite() {
        return OVERFLOW;
    }
    let dec = dec_places.min(DIGITS_PER_UNIT as u8 - 1);

    let mut scaled = value;
    for _ in 0..dec {
        scaled *= 10.0;
    }
    let rounded = if scaled >= 0.0 {
        scaled + 0.5
    } else {
        scaled - 0.5
    };

    // `as` saturates; saturated values land outside the range and overflow
    let point = if dec == 0 {
        None
    } else {
        Some(DIGITS_PER_UNIT as u8 - dec)
    };
    digit_codes(rounded as i32, point, Radix::Decimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::glyph::glyph_for_digit;
    use proptest::prelude::*;

    fn d(n: u8) -> u8 {
        glyph_for_digit(n).unwrap()
    }

    #[test]
    fn test_leading_zeros_blanked() {
        assert_eq!(digit_codes(42, None, Radix::Decimal), [BLANK, BLANK, d(4), d(2)]);
        assert_eq!(digit_codes(0, None, Radix::Decimal), [BLANK, BLANK, BLANK, d(0)]);
        assert_eq!(digit_codes(1005, None, Radix::Decimal), [d(1), d(0), d(0), d(5)]);
    }

    #[test]
    fn test_out_of_range_is_dashes() {
        assert_eq!(digit_codes(10000, None, Radix::Decimal), OVERFLOW);
        assert_eq!(digit_codes(-1000, None, Radix::Decimal), OVERFLOW);
        assert_eq!(digit_codes(9999, None, Radix::Decimal), [d(9); 4]);
        assert_eq!(digit_codes(-999, None, Radix::Decimal), [DASH, d(9), d(9), d(9)]);
    }

    #[test]
    fn test_negative_keeps_sign() {
        assert_eq!(digit_codes(-5, None, Radix::Decimal), [DASH, BLANK, BLANK, d(5)]);
        assert_eq!(digit_codes(-50, None, Radix::Decimal), [DASH, BLANK, d(5), d(0)]);
    }

    #[test]
    fn test_hex() {
        assert_eq!(digit_codes(0xBEEF, None, Radix::Hex), [d(11), d(14), d(14), d(15)]);
        assert_eq!(digit_codes(0x1A, None, Radix::Hex), [BLANK, BLANK, d(1), d(10)]);
        assert_eq!(digit_codes(0x10000, None, Radix::Hex), OVERFLOW);
        assert_eq!(digit_codes(-0xFFF, None, Radix::Hex), [DASH, d(15), d(15), d(15)]);
    }

    #[test]
    fn test_point_stops_blanking() {
        // point at position 2 lights digit 1
        assert_eq!(
            digit_codes(5, Some(2), Radix::Decimal),
            [BLANK, d(0) | POINT, d(0), d(5)]
        );
        assert_eq!(digit_codes(5, Some(0), Radix::Decimal), digit_codes(5, None, Radix::Decimal));
        assert_eq!(digit_codes(5, Some(9), Radix::Decimal), digit_codes(5, None, Radix::Decimal));
    }

    #[test]
    fn test_float_rounding() {
        assert_eq!(float_codes(3.14159, 2), [BLANK, d(3) | POINT, d(1), d(4)]);
        assert_eq!(float_codes(2.005, 1), [BLANK, BLANK, d(2) | POINT, d(0)]);
        assert_eq!(float_codes(-1.25, 1), [DASH, BLANK, d(1) | POINT, d(3)]);
        assert_eq!(float_codes(23.456, 2), [d(2), d(3) | POINT, d(4), d(6)]);
        assert_eq!(float_codes(0.5, 0), [BLANK, BLANK, BLANK, d(1)]);
    }

    #[test]
    fn test_float_overflow() {
        assert_eq!(float_codes(100.0, 2), OVERFLOW);
        assert_eq!(float_codes(f32::NAN, 1), OVERFLOW);
        assert_eq!(float_codes(f32::INFINITY, 0), OVERFLOW);
        assert_eq!(float_codes(1.0e12, 0), OVERFLOW);
    }

    proptest! {
        #[test]
        fn test_decimal_range_is_never_overflow(value in -999i32..=9999) {
            let codes = digit_codes(value, None, Radix::Decimal);
            prop_assert_ne!(codes, OVERFLOW);
            // Last digit always shows a numeral
            prop_assert_eq!(codes[3], d((value.abs() % 10) as u8));
        }

        #[test]
        fn test_outside_range_is_overflow(value in prop_oneof![10000i32..i32::MAX, i32::MIN..-999]) {
            prop_assert_eq!(digit_codes(value, None, Radix::Decimal), OVERFLOW);
        }
    }
}
