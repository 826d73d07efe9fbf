//! Configuration type definitions
//!
//! Defaults reproduce the reference hardware: one SCD4x, four 4-digit
//! units behind 16-bit shift registers, and a broker on the local network.

use core::fmt;

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum WiFi SSID length
pub const MAX_SSID_LEN: usize = 32;

/// Maximum length of passwords and host names
pub const MAX_SECRET_LEN: usize = 64;

/// Maximum topic prefix length
pub const MAX_TOPIC_PREFIX_LEN: usize = 48;

/// Maximum client identifier prefix length
pub const MAX_CLIENT_ID_LEN: usize = 24;

/// Bits in one unit's shift register image
pub const REGISTER_BITS: u8 = 16;

/// Copy `s` into a fixed-capacity string, truncating at capacity
pub fn fixed_str<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for ch in s.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Sensor acquisition and recovery timing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct SensorTiming {
    /// Minimum time between two data-ready checks
    pub poll_interval_ms: u32,
    /// Hold-off after start-up before the first poll
    pub warmup_ms: u32,
    /// Delay before powering the chip down during recovery
    pub recovery_delay_ms: u32,
    /// Settle time after power-down during recovery
    pub power_down_settle_ms: u32,
    /// Settle time after stopping periodic measurement
    pub stop_settle_ms: u32,
    /// Hold-off after a recovery before the next poll
    pub recovery_grace_ms: u32,
    /// Acquisition loop period
    pub tick_interval_ms: u32,
}

impl Default for SensorTiming {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            warmup_ms: 5000,
            recovery_delay_ms: 100,
            power_down_settle_ms: 1000,
            stop_settle_ms: 600,
            recovery_grace_ms: 5000,
            tick_interval_ms: 100,
        }
    }
}

/// Multiplexing strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScanMode {
    /// One segment line per tick, all digits that use it lit together
    #[default]
    Segment,
    /// One digit per tick with its full segment code
    Digit,
}

impl ScanMode {
    /// Planes in one full refresh cycle
    pub const fn planes(self) -> usize {
        match self {
            ScanMode::Segment => 8,
            ScanMode::Digit => 4,
        }
    }

    /// The other mode
    pub const fn toggled(self) -> Self {
        match self {
            ScanMode::Segment => ScanMode::Digit,
            ScanMode::Digit => ScanMode::Segment,
        }
    }
}

/// Display renderer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct DisplayConfig {
    /// Time each plane stays lit, in µs
    pub on_interval_us: u32,
    /// Dark time between planes, in µs (0 disables dimming)
    pub off_interval_us: u32,
    /// Off interval adjustment per brightness request, in µs
    pub brightness_step_us: u32,
    /// Initial multiplexing strategy
    pub scan_mode: ScanMode,
    /// Register bit driving each digit line (active-low)
    pub digit_bits: [u8; 4],
    /// Register bit driving segments A..G and P (active-high)
    pub segment_bits: [u8; 8],
    /// Automatic sensor rotation period on the dashboard (0 disables)
    pub rotate_interval_ms: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            on_interval_us: 800,
            off_interval_us: 400,
            brightness_step_us: 50,
            scan_mode: ScanMode::Segment,
            digit_bits: [10, 13, 14, 2],
            segment_bits: [11, 15, 4, 6, 7, 12, 3, 5],
            rotate_interval_ms: 2000,
        }
    }
}

/// Broker reporting configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ReportConfig {
    /// Time between report cycles
    pub interval_ms: u32,
    /// Prepended to the metric name to form the topic
    pub topic_prefix: String<MAX_TOPIC_PREFIX_LEN>,
    /// MQTT QoS level for publishes
    pub qos: u8,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            interval_ms: 60_000,
            topic_prefix: fixed_str("home/weather_station/"),
            qos: 1,
        }
    }
}

/// Network credentials and broker address, passed through to the network layer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct NetworkConfig {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_SECRET_LEN>,
    pub broker_host: String<MAX_SECRET_LEN>,
    pub broker_port: u16,
    pub username: String<MAX_SSID_LEN>,
    pub broker_password: String<MAX_SECRET_LEN>,
    /// Prefix of the client id; the board id is appended
    pub client_id_prefix: String<MAX_CLIENT_ID_LEN>,
    pub keep_alive_s: u16,
    /// WiFi join attempts before giving up
    pub connect_retries: u8,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            broker_host: fixed_str("mqtt.local"),
            broker_port: 1883,
            username: String::new(),
            broker_password: String::new(),
            client_id_prefix: fixed_str("pico"),
            keep_alive_s: 60,
            connect_retries: 3,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct DeviceConfig {
    pub sensor: SensorTiming,
    pub display: DisplayConfig,
    pub report: ReportConfig,
    pub network: NetworkConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// An interval that must be positive is zero
    ZeroInterval,
    /// Off interval must be shorter than the on interval
    OffIntervalTooLong,
    /// Brightness step must be positive and shorter than the on interval
    InvalidBrightnessStep,
    /// A register bit is 16 or above
    BitOutOfRange,
    /// Two lines share a register bit
    DuplicateBit,
    /// Reports must not be more frequent than sensor polls
    ReportIntervalTooShort,
    /// Topic prefix is empty
    EmptyTopicPrefix,
    /// QoS above 2
    InvalidQos,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::ZeroInterval => "interval must be greater than zero",
            ConfigError::OffIntervalTooLong => "display off interval must be below on interval",
            ConfigError::InvalidBrightnessStep => {
                "brightness step must be positive and below on interval"
            }
            ConfigError::BitOutOfRange => "register bit must be below 16",
            ConfigError::DuplicateBit => "register bits must be unique",
            ConfigError::ReportIntervalTooShort => "report interval below sensor poll interval",
            ConfigError::EmptyTopicPrefix => "topic prefix must not be empty",
            ConfigError::InvalidQos => "qos must be 0, 1 or 2",
        };
        f.write_str(msg)
    }
}

impl DisplayConfig {
    /// Check timing and register bit layout
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.on_interval_us == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.off_interval_us >= self.on_interval_us {
            return Err(ConfigError::OffIntervalTooLong);
        }
        if self.brightness_step_us == 0 || self.brightness_step_us >= self.on_interval_us {
            return Err(ConfigError::InvalidBrightnessStep);
        }

        let mut used: u16 = 0;
        for &bit in self.digit_bits.iter().chain(self.segment_bits.iter()) {
            if bit >= REGISTER_BITS {
                return Err(ConfigError::BitOutOfRange);
            }
            if used & (1 << bit) != 0 {
                return Err(ConfigError::DuplicateBit);
            }
            used |= 1 << bit;
        }
        Ok(())
    }

    /// Register mask of all digit lines
    pub fn digit_mask(&self) -> u16 {
        self.digit_bits.iter().fold(0, |mask, &bit| mask | (1 << bit))
    }
}

impl DeviceConfig {
    /// Check the whole configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.sensor;
        if s.poll_interval_ms == 0 || s.tick_interval_ms == 0 || self.report.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        self.display.validate()?;
        if self.report.interval_ms < s.poll_interval_ms {
            return Err(ConfigError::ReportIntervalTooShort);
        }
        if self.report.topic_prefix.is_empty() {
            return Err(ConfigError::EmptyTopicPrefix);
        }
        if self.report.qos > 2 {
            return Err(ConfigError::InvalidQos);
        }
        Ok(())
    }

    /// Serialize to postcard bytes in `buf`
    #[cfg(feature = "serde")]
    pub fn to_postcard<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], postcard::Error> {
        postcard::to_slice(self, buf)
    }

    /// Deserialize from postcard bytes
    #[cfg(feature = "serde")]
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DeviceConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.report.topic_prefix.as_str(), "home/weather_station/");
        assert_eq!(config.network.broker_port, 1883);
    }

    #[test]
    fn test_display_timing_rules() {
        let mut display = DisplayConfig::default();
        display.off_interval_us = 800;
        assert_eq!(display.validate(), Err(ConfigError::OffIntervalTooLong));

        let mut display = DisplayConfig::default();
        display.brightness_step_us = 0;
        assert_eq!(display.validate(), Err(ConfigError::InvalidBrightnessStep));

        let mut display = DisplayConfig::default();
        display.off_interval_us = 0;
        assert_eq!(display.validate(), Ok(()));
    }

    #[test]
    fn test_register_bits_checked() {
        let mut display = DisplayConfig::default();
        display.segment_bits[7] = 16;
        assert_eq!(display.validate(), Err(ConfigError::BitOutOfRange));

        let mut display = DisplayConfig::default();
        display.segment_bits[0] = display.digit_bits[0];
        assert_eq!(display.validate(), Err(ConfigError::DuplicateBit));
    }

    #[test]
    fn test_digit_mask() {
        let display = DisplayConfig::default();
        assert_eq!(display.digit_mask(), (1 << 10) | (1 << 13) | (1 << 14) | (1 << 2));
    }

    #[test]
    fn test_report_rules() {
        let mut config = DeviceConfig::default();
        config.report.interval_ms = 500;
        assert_eq!(config.validate(), Err(ConfigError::ReportIntervalTooShort));

        let mut config = DeviceConfig::default();
        config.report.topic_prefix.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyTopicPrefix));

        let mut config = DeviceConfig::default();
        config.report.qos = 3;
        assert_eq!(config.validate(), Err(ConfigError::InvalidQos));
    }

    #[test]
    fn test_fixed_str_truncates() {
        let s: String<4> = fixed_str("canary");
        assert_eq!(s.as_str(), "cana");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_roundtrip() {
        let mut config = DeviceConfig::default();
        config.network.ssid = fixed_str("attic");
        config.display.scan_mode = ScanMode::Digit;

        let mut buf = [0u8; 512];
        let bytes = config.to_postcard(&mut buf).unwrap();
        assert_eq!(DeviceConfig::from_postcard(bytes).unwrap(), config);
    }
}
