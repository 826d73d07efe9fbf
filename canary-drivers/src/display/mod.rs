//! Seven-segment display drivers

pub mod multiplex;

pub use multiplex::MultiDisplay;
