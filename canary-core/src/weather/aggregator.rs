//! Multi-sensor reading aggregation
//!
//! The aggregator owns a fixed set of sensors. Slot order is the display
//! routing order: slot 0 is shown first and `switch_display` walks the
//! slots round-robin.
//!
//! # CO2 fallback
//!
//! A fresh reading whose CO2 is the 0 sentinel takes the highest measured
//! CO2 held by any slot at that moment. This is a heuristic, not a
//! measurement, and biases toward whichever sensor last reported a high
//! value. Values filled in this way are flagged and never serve as a
//! fallback source themselves.

use canary_protocol::WeatherUpdate;

use crate::traits::{Reading, Sensor};

/// One sensor with its latest reading
#[derive(Debug)]
pub struct SensorSlot<S> {
    sensor: S,
    reading: Reading,
    timestamp_ms: u64,
    co2_substituted: bool,
}

impl<S> SensorSlot<S> {
    fn new(sensor: S) -> Self {
        Self {
            sensor,
            reading: Reading::default(),
            timestamp_ms: 0,
            co2_substituted: false,
        }
    }

    /// The owned sensor
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Latest reading, with CO2 fallback applied
    pub fn reading(&self) -> Reading {
        self.reading
    }

    /// Capture time of the latest reading (0 if none yet)
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// True if the CO2 value came from another slot
    pub fn is_co2_substituted(&self) -> bool {
        self.co2_substituted
    }
}

/// Merges the readings of `N` sensors
pub struct Aggregator<S: Sensor, const N: usize> {
    slots: [SensorSlot<S>; N],
    selected: usize,
}

impl<S: Sensor, const N: usize> Aggregator<S, N> {
    /// Create an aggregator over `sensors`, selecting slot 0
    pub fn new(sensors: [S; N]) -> Self {
        Self {
            slots: sensors.map(SensorSlot::new),
            selected: 0,
        }
    }

    /// Poll every sensor and merge new readings
    ///
    /// A refreshed slot reporting co2 = 0 takes the highest co2 across all
    /// slots. Only measured values count toward that maximum, never values
    /// copied in by an earlier fallback, so a copy cannot outlive the
    /// reading it came from.
    ///
    /// Returns the oldest capture time across all slots, so callers can
    /// detect stale data. A slot that never produced a reading counts as 0.
    pub fn tick(&mut self, now_ms: u64) -> u64 {
        let mut refreshed = [false; N];

        for (i, slot) in self.slots.iter_mut().enumerate() {
            if !slot.sensor.poll(now_ms) {
                continue;
            }
            slot.reading = slot.sensor.current_reading();
            slot.timestamp_ms = slot.timestamp_ms.max(now_ms);
            slot.co2_substituted = false;
            refreshed[i] = true;
            debug!(
                "Sensor {}: co2={} temp={} hum={}",
                i, slot.reading.co2, slot.reading.temperature, slot.reading.humidity
            );
        }

        // Fill after all new readings are stored so slot order does not matter
        let fallback = self.max_measured_co2();
        if fallback != 0 {
            for (slot, fresh) in self.slots.iter_mut().zip(refreshed) {
                if fresh && !slot.reading.has_co2() {
                    slot.reading.co2 = fallback;
                    slot.co2_substituted = true;
                }
            }
        }

        self.slots
            .iter()
            .map(|s| s.timestamp_ms)
            .min()
            .unwrap_or(now_ms)
    }

    /// Highest co2 among slots whose value is their own measurement
    fn max_measured_co2(&self) -> u16 {
        self.slots
            .iter()
            .filter(|s| !s.co2_substituted)
            .map(|s| s.reading.co2)
            .max()
            .unwrap_or(0)
    }

    /// Advance the selection round-robin and return the new index
    pub fn switch_display(&mut self) -> usize {
        if N > 0 {
            self.selected = (self.selected + 1) % N;
        }
        self.selected
    }

    /// Index of the selected slot
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Reading of the selected slot
    pub fn current(&self) -> Reading {
        self.slots
            .get(self.selected)
            .map(|s| s.reading)
            .unwrap_or_default()
    }

    /// CO2 of the selected slot, in ppm
    pub fn co2(&self) -> u16 {
        self.current().co2
    }

    /// Temperature of the selected slot, in °C
    pub fn temperature(&self) -> f32 {
        self.current().temperature
    }

    /// Humidity of the selected slot, in %
    pub fn humidity(&self) -> f32 {
        self.current().humidity
    }

    /// All slots in routing order
    pub fn slots(&self) -> &[SensorSlot<S>] {
        &self.slots
    }

    /// Dashboard snapshot of the selected slot
    pub fn weather_update(&self, aux_temperature: f32) -> WeatherUpdate {
        let reading = self.current();
        WeatherUpdate {
            co2: reading.co2,
            temperature: reading.temperature,
            humidity: reading.humidity,
            aux_temperature,
        }
    }
}
