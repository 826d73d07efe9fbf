//! Seven-segment glyphs and number layout
//!
//! Pure conversions from values to per-digit segment codes. Rendering the
//! codes onto hardware is the job of a [`SegmentDisplay`](crate::traits::SegmentDisplay)
//! implementation.

pub mod glyph;
pub mod number;

pub use glyph::glyph_for_digit;
pub use number::{digit_codes, float_codes};
