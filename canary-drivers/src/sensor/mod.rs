//! Environmental sensor drivers

pub mod scd4x;
pub mod scd4x_i2c;

pub use scd4x::{ChipStatus, RawMeasurement, Scd4x, Scd4xChip};
pub use scd4x_i2c::Scd4xI2c;
