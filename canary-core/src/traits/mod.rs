//! Capability traits
//!
//! These traits define the interface between the application logic
//! and hardware- or transport-specific implementations.

pub mod display;
pub mod publish;
pub mod sensor;

pub use display::{Radix, SegmentDisplay, DIGITS_PER_UNIT};
pub use publish::{PublishError, PublishId, Publisher};
pub use sensor::{Reading, Sensor};
