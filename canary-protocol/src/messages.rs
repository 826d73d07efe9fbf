//! Message types for the telemetry protocol
//!
//! Tag table (tag word → payload words):
//! - `0` reserved, never sent
//! - `1` weather update → 4 words (co2, temperature, humidity, aux temperature)
//! - `2` increase refresh interval → 0 words
//! - `3` decrease refresh interval → 0 words
//! - `4` switch scan mode → 0 words

use heapless::Vec;

// Message tags
pub const TAG_UNKNOWN: u32 = 0;
pub const TAG_WEATHER_UPDATE: u32 = 1;
pub const TAG_INCREASE_REFRESH: u32 = 2;
pub const TAG_DECREASE_REFRESH: u32 = 3;
pub const TAG_SWITCH_SCAN_MODE: u32 = 4;

/// Largest payload of any message, in words
pub const MAX_PAYLOAD_WORDS: usize = 4;

/// Largest complete message (TAG + MAX_PAYLOAD_WORDS)
pub const MAX_MESSAGE_WORDS: usize = 1 + MAX_PAYLOAD_WORDS;

/// Errors raised when a word stream violates the tag contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Tag word is not in the tag table
    UnknownTag(u32),
    /// Payload word count does not match the tag
    PayloadLength { tag: u32, expected: usize, actual: usize },
    /// A payload word is outside the range of its field
    ValueOutOfRange { tag: u32, index: usize },
}

/// Number of payload words that follow `tag`, or `None` for an unknown tag
pub const fn payload_len(tag: u32) -> Option<usize> {
    match tag {
        TAG_WEATHER_UPDATE => Some(4),
        TAG_INCREASE_REFRESH | TAG_DECREASE_REFRESH | TAG_SWITCH_SCAN_MODE => Some(0),
        _ => None,
    }
}

/// One snapshot of the dashboard values
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WeatherUpdate {
    /// CO2 concentration in ppm
    pub co2: u16,
    /// Temperature in °C
    pub temperature: f32,
    /// Relative humidity in %
    pub humidity: f32,
    /// Board temperature in °C
    pub aux_temperature: f32,
}

/// Messages from the acquisition core to the render core
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryMessage {
    /// New values for the dashboard
    WeatherUpdate(WeatherUpdate),
    /// Lengthen the display off phase (dimmer)
    IncreaseRefreshInterval,
    /// Shorten the display off phase (brighter)
    DecreaseRefreshInterval,
    /// Toggle between segment and digit scanning
    SwitchScanMode,
}

impl TelemetryMessage {
    /// Tag word for this message
    pub fn tag(&self) -> u32 {
        match self {
            TelemetryMessage::WeatherUpdate(_) => TAG_WEATHER_UPDATE,
            TelemetryMessage::IncreaseRefreshInterval => TAG_INCREASE_REFRESH,
            TelemetryMessage::DecreaseRefreshInterval => TAG_DECREASE_REFRESH,
            TelemetryMessage::SwitchScanMode => TAG_SWITCH_SCAN_MODE,
        }
    }

    /// Serialize into the word sequence sent over the channel
    pub fn encode(&self) -> Vec<u32, MAX_MESSAGE_WORDS> {
        let mut words = Vec::new();
        // Capacity covers the largest message, so pushes cannot fail
        let _ = words.push(self.tag());
        if let TelemetryMessage::WeatherUpdate(update) = self {
            let _ = words.push(update.co2 as u32);
            let _ = words.push(update.temperature.to_bits());
            let _ = words.push(update.humidity.to_bits());
            let _ = words.push(update.aux_temperature.to_bits());
        }
        words
    }

    /// Rebuild a message from its tag and exactly `payload_len(tag)` words
    pub fn decode(tag: u32, payload: &[u32]) -> Result<Self, ProtocolError> {
        let expected = payload_len(tag).ok_or(ProtocolError::UnknownTag(tag))?;
        if payload.len() != expected {
            return Err(ProtocolError::PayloadLength {
                tag,
                expected,
                actual: payload.len(),
            });
        }

        match tag {
            TAG_WEATHER_UPDATE => {
                let co2 = u16::try_from(payload[0])
                    .map_err(|_| ProtocolError::ValueOutOfRange { tag, index: 0 })?;
                Ok(TelemetryMessage::WeatherUpdate(WeatherUpdate {
                    co2,
                    temperature: f32::from_bits(payload[1]),
                    humidity: f32::from_bits(payload[2]),
                    aux_temperature: f32::from_bits(payload[3]),
                }))
            }
            TAG_INCREASE_REFRESH => Ok(TelemetryMessage::IncreaseRefreshInterval),
            TAG_DECREASE_REFRESH => Ok(TelemetryMessage::DecreaseRefreshInterval),
            TAG_SWITCH_SCAN_MODE => Ok(TelemetryMessage::SwitchScanMode),
            _ => Err(ProtocolError::UnknownTag(tag)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_weather_update_layout() {
        let msg = TelemetryMessage::WeatherUpdate(WeatherUpdate {
            co2: 812,
            temperature: 21.5,
            humidity: 40.25,
            aux_temperature: 27.0,
        });
        let words = msg.encode();

        assert_eq!(words.len(), 5);
        assert_eq!(words[0], TAG_WEATHER_UPDATE);
        assert_eq!(words[1], 812);
        assert_eq!(words[2], 21.5f32.to_bits());
        assert_eq!(words[3], 40.25f32.to_bits());
        assert_eq!(words[4], 27.0f32.to_bits());
    }

    #[test]
    fn test_control_messages_have_no_payload() {
        assert_eq!(
            TelemetryMessage::IncreaseRefreshInterval.encode().as_slice(),
            &[TAG_INCREASE_REFRESH]
        );
        assert_eq!(
            TelemetryMessage::DecreaseRefreshInterval.encode().as_slice(),
            &[TAG_DECREASE_REFRESH]
        );
        assert_eq!(
            TelemetryMessage::SwitchScanMode.encode().as_slice(),
            &[TAG_SWITCH_SCAN_MODE]
        );
        assert_eq!(
            TelemetryMessage::decode(TAG_SWITCH_SCAN_MODE, &[]),
            Ok(TelemetryMessage::SwitchScanMode)
        );
    }

    #[test]
    fn test_reserved_tag_is_unknown() {
        assert_eq!(payload_len(TAG_UNKNOWN), None);
        assert_eq!(
            TelemetryMessage::decode(TAG_UNKNOWN, &[]),
            Err(ProtocolError::UnknownTag(TAG_UNKNOWN))
        );
    }

    #[test]
    fn test_decode_rejects_short_payload() {
        let result = TelemetryMessage::decode(TAG_WEATHER_UPDATE, &[400, 0]);
        assert_eq!(
            result,
            Err(ProtocolError::PayloadLength {
                tag: TAG_WEATHER_UPDATE,
                expected: 4,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_decode_rejects_oversized_co2() {
        let result = TelemetryMessage::decode(TAG_WEATHER_UPDATE, &[70_000, 0, 0, 0]);
        assert_eq!(
            result,
            Err(ProtocolError::ValueOutOfRange {
                tag: TAG_WEATHER_UPDATE,
                index: 0,
            })
        );
    }

    proptest! {
        #[test]
        fn test_weather_update_preserves_bits(
            co2 in any::<u16>(),
            temp in any::<u32>(),
            hum in any::<u32>(),
            aux in any::<u32>(),
        ) {
            let msg = TelemetryMessage::WeatherUpdate(WeatherUpdate {
                co2,
                temperature: f32::from_bits(temp),
                humidity: f32::from_bits(hum),
                aux_temperature: f32::from_bits(aux),
            });
            let words = msg.encode();
            let decoded = TelemetryMessage::decode(words[0], &words[1..]).unwrap();

            // Compare bit patterns; NaN payloads must survive too
            match decoded {
                TelemetryMessage::WeatherUpdate(u) => {
                    prop_assert_eq!(u.co2, co2);
                    prop_assert_eq!(u.temperature.to_bits(), temp);
                    prop_assert_eq!(u.humidity.to_bits(), hum);
                    prop_assert_eq!(u.aux_temperature.to_bits(), aux);
                }
                other => prop_assert!(false, "unexpected message {:?}", other),
            }
        }
    }
}
