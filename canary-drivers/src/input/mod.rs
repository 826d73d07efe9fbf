//! User input drivers

pub mod button;

pub use button::{Button, Press, LONG_PRESS_MS};
