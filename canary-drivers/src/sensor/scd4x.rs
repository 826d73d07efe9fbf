//! Sensirion SCD4x CO2 sensor driver
//!
//! Runs the SCD4x in periodic measurement mode (one sample every 5 s) and
//! polls its data-ready flag no more often than the configured interval.
//!
//! # Recovery
//!
//! The chip occasionally stops acknowledging on the bus. The chip layer
//! reports this as [`ChipStatus::TRANSIENT_FAULT`]; the driver then power
//! cycles the measurement engine:
//!
//! ```text
//! delay → power_down → settle → wake_up → stop_periodic → settle
//!       → reinit → start_periodic → hold off for the grace window
//! ```
//!
//! There is no retry limit. The restart counter is diagnostic only.

use core::fmt;

use canary_core::config::SensorTiming;
use canary_core::traits::{Reading, Sensor};
use embedded_hal::delay::DelayNs;

/// Nonzero status code reported by the chip layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipStatus(pub i16);

impl ChipStatus {
    /// Chip stopped responding; recovered by a power cycle
    pub const TRANSIENT_FAULT: ChipStatus = ChipStatus(-123);
    /// Bus error other than a missing acknowledge
    pub const BUS_FAULT: ChipStatus = ChipStatus(-1);
    /// Response word failed its CRC check
    pub const CRC_MISMATCH: ChipStatus = ChipStatus(1);

    /// Check if this status triggers recovery
    pub fn is_transient(&self) -> bool {
        *self == Self::TRANSIENT_FAULT
    }
}

impl fmt::Display for ChipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chip status {}", self.0)
    }
}

/// One measurement as delivered by the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawMeasurement {
    /// CO2 in ppm, 0 when the chip has no valid sample
    pub co2: u16,
    /// Temperature in m°C
    pub temperature_milli_c: i32,
    /// Relative humidity in m%
    pub humidity_milli: i32,
}

/// SCD4x command set as seen by the driver
///
/// Implemented over I2C by [`Scd4xI2c`](super::Scd4xI2c); tests use a
/// scripted mock.
pub trait Scd4xChip {
    /// Check whether a new sample is waiting
    fn data_ready(&mut self) -> Result<bool, ChipStatus>;

    /// Read and clear the waiting sample
    fn read_measurement(&mut self) -> Result<RawMeasurement, ChipStatus>;

    /// Wake from power-down
    fn wake_up(&mut self) -> Result<(), ChipStatus>;

    /// Enter power-down
    fn power_down(&mut self) -> Result<(), ChipStatus>;

    /// Reload settings from EEPROM
    fn reinit(&mut self) -> Result<(), ChipStatus>;

    /// Start periodic measurement
    fn start_periodic(&mut self) -> Result<(), ChipStatus>;

    /// Stop periodic measurement
    fn stop_periodic(&mut self) -> Result<(), ChipStatus>;

    /// 48-bit serial number
    fn serial_number(&mut self) -> Result<u64, ChipStatus>;
}

/// Polled SCD4x driver with automatic fault recovery
pub struct Scd4x<C, D> {
    chip: C,
    delay: D,
    timing: SensorTiming,
    reading: Reading,
    next_poll_ms: u64,
    restarts: u32,
}

impl<C: Scd4xChip, D: DelayNs> Scd4x<C, D> {
    /// Create a driver; call [`begin`](Self::begin) before polling
    pub fn new(chip: C, delay: D, timing: SensorTiming) -> Self {
        Self {
            chip,
            delay,
            timing,
            reading: Reading::default(),
            next_poll_ms: 0,
            restarts: 0,
        }
    }

    /// Bring the chip into periodic measurement mode
    ///
    /// Failures are logged; a chip that is not responding is picked up by
    /// the recovery path on the first poll. Returns the serial number if it
    /// could be read.
    pub fn begin(&mut self, now_ms: u64) -> Option<u64> {
        // wake_up is never acknowledged by the chip
        let _ = self.chip.wake_up();
        log_failure("stop_periodic", self.chip.stop_periodic());
        self.delay.delay_ms(self.timing.stop_settle_ms);
        log_failure("reinit", self.chip.reinit());

        let serial = match self.chip.serial_number() {
            Ok(serial) => {
                info!("SCD4x serial {}", serial);
                Some(serial)
            }
            Err(status) => {
                warn!("SCD4x serial read failed: {}", status.0);
                None
            }
        };

        log_failure("start_periodic", self.chip.start_periodic());
        self.next_poll_ms = now_ms + self.timing.warmup_ms as u64;
        serial
    }

    /// Number of recoveries performed
    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    /// Earliest time the next poll talks to the chip
    pub fn next_poll_ms(&self) -> u64 {
        self.next_poll_ms
    }

    /// The chip layer
    pub fn chip(&self) -> &C {
        &self.chip
    }

    fn recover(&mut self, now_ms: u64) {
        self.restarts += 1;
        warn!("SCD4x not responding, restart #{}", self.restarts);

        self.delay.delay_ms(self.timing.recovery_delay_ms);
        log_failure("power_down", self.chip.power_down());
        self.delay.delay_ms(self.timing.power_down_settle_ms);
        let _ = self.chip.wake_up();
        log_failure("stop_periodic", self.chip.stop_periodic());
        self.delay.delay_ms(self.timing.stop_settle_ms);
        log_failure("reinit", self.chip.reinit());
        log_failure("start_periodic", self.chip.start_periodic());

        self.next_poll_ms = now_ms + self.timing.recovery_grace_ms as u64;
    }

    /// Route a failed chip call: recover on a transient fault, log otherwise
    fn handle_status(&mut self, now_ms: u64, op: &str, status: ChipStatus) {
        if status.is_transient() {
            self.recover(now_ms);
        } else {
            warn!("SCD4x {} failed: {}", op, status.0);
        }
    }
}

impl<C: Scd4xChip, D: DelayNs> Sensor for Scd4x<C, D> {
    fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms < self.next_poll_ms {
            return false;
        }
        self.next_poll_ms = now_ms + self.timing.poll_interval_ms as u64;

        match self.chip.data_ready() {
            Ok(true) => {}
            Ok(false) => return false,
            Err(status) => {
                self.handle_status(now_ms, "data_ready", status);
                return false;
            }
        }

        let raw = match self.chip.read_measurement() {
            Ok(raw) => raw,
            Err(status) => {
                self.handle_status(now_ms, "read_measurement", status);
                return false;
            }
        };

        if raw.co2 == 0 {
            debug!("SCD4x invalid sample");
            return false;
        }

        self.reading = Reading {
            co2: raw.co2,
            temperature: raw.temperature_milli_c as f32 / 1000.0,
            humidity: raw.humidity_milli as f32 / 1000.0,
        };
        true
    }

    fn current_reading(&self) -> Reading {
        self.reading
    }
}

fn log_failure(op: &str, result: Result<(), ChipStatus>) {
    if let Err(status) = result {
        warn!("SCD4x {} failed: {}", op, status.0);
    }
}
