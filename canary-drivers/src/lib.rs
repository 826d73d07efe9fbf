//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in canary-core, written against `embedded-hal` 1.0:
//!
//! - Sensors (SCD4x CO2 / temperature / humidity, with fault recovery)
//! - Displays (shift-register multiplexed seven-segment units)
//! - Inputs (push buttons)

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod display;
pub mod input;
pub mod sensor;
