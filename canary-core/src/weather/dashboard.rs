//! Dashboard layout
//!
//! | Unit | Shows                      | Example |
//! |------|----------------------------|---------|
//! | 0    | CO2 ppm                    | ` 812`  |
//! | 1    | temperature, °C marker     | `21.5c` |
//! | 2    | relative humidity          | `40.25` |
//! | 3    | board temperature, °C marker | `27.3c` |

use canary_protocol::WeatherUpdate;

use crate::segments::glyph::CELSIUS;
use crate::traits::{Radix, SegmentDisplay, DIGITS_PER_UNIT};

pub const UNIT_CO2: usize = 0;
pub const UNIT_TEMPERATURE: usize = 1;
pub const UNIT_HUMIDITY: usize = 2;
pub const UNIT_AUX_TEMPERATURE: usize = 3;

/// Write a weather snapshot onto the display units
///
/// Units the display does not have are skipped.
pub fn show_weather<D: SegmentDisplay>(display: &mut D, update: &WeatherUpdate) {
    display.set_number(UNIT_CO2, update.co2 as i32, None, Radix::Decimal);
    show_temperature(display, UNIT_TEMPERATURE, update.temperature);
    display.set_number_f(UNIT_HUMIDITY, update.humidity, 2);
    show_temperature(display, UNIT_AUX_TEMPERATURE, update.aux_temperature);
}

/// Two decimals with the last digit replaced by the unit marker
fn show_temperature<D: SegmentDisplay>(display: &mut D, unit: usize, celsius: f32) {
    display.set_number_f(unit, celsius, 2);
    display.set_digit(unit, DIGITS_PER_UNIT - 1, CELSIUS);
}
