//! Board-agnostic core logic for the Canary telemetry appliance
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Capability traits (sensor, publisher, segment display)
//! - Reading aggregation with cross-sensor CO2 fallback
//! - Seven-segment glyphs and number layout
//! - The report sequencer and its cycle state machine
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod report;
pub mod segments;
pub mod traits;
pub mod weather;
