//! Sensor capability

/// One measurement captured by a sensor
///
/// A `co2` of 0 is the sentinel for "no CO2 value available"; sensors that
/// do not measure CO2 always report it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// CO2 concentration in ppm
    pub co2: u16,
    /// Temperature in °C
    pub temperature: f32,
    /// Relative humidity in %
    pub humidity: f32,
}

impl Reading {
    /// Check whether the reading carries a measured CO2 value
    pub fn has_co2(&self) -> bool {
        self.co2 != 0
    }
}

/// Trait for polled environmental sensors
///
/// Implementations run their own acquisition state machine and must not
/// block longer than the chip's acquisition latency per call, except for
/// bounded recovery settle times.
pub trait Sensor {
    /// Advance the sensor state machine
    ///
    /// Returns `true` exactly when a new, valid reading was captured by this
    /// call. `now_ms` is a monotonic millisecond clock.
    fn poll(&mut self, now_ms: u64) -> bool;

    /// Most recent valid reading
    fn current_reading(&self) -> Reading;
}
