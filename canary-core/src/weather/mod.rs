//! Reading aggregation and dashboard layout

pub mod aggregator;
pub mod dashboard;

pub use aggregator::{Aggregator, SensorSlot};
pub use dashboard::show_weather;
