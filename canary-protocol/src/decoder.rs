//! Streaming reassembly of telemetry messages from words

use crate::messages::{payload_len, ProtocolError, TelemetryMessage, MAX_PAYLOAD_WORDS};
use heapless::Vec;

/// State machine that turns a word stream back into messages
#[derive(Debug, Clone)]
pub struct MessageDecoder {
    state: DecodeState,
    tag: u32,
    expected: usize,
    payload: Vec<u32, MAX_PAYLOAD_WORDS>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Next word is a tag
    AwaitingTag,
    /// Collecting the payload of `tag`
    ReadingPayload,
}

impl Default for MessageDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageDecoder {
    /// Create a decoder positioned at a message boundary
    pub const fn new() -> Self {
        Self {
            state: DecodeState::AwaitingTag,
            tag: 0,
            expected: 0,
            payload: Vec::new(),
        }
    }

    /// True while a message has started but its payload is incomplete
    pub fn in_message(&self) -> bool {
        self.state == DecodeState::ReadingPayload
    }

    /// Feed a single word to the decoder
    ///
    /// Returns `Ok(Some(msg))` when the word completes a message, `Ok(None)`
    /// when more words are needed, or `Err` when the tag is not in the table.
    /// An error leaves the stream position undefined; there is no resync.
    pub fn feed(&mut self, word: u32) -> Result<Option<TelemetryMessage>, ProtocolError> {
        match self.state {
            DecodeState::AwaitingTag => {
                let expected = payload_len(word).ok_or(ProtocolError::UnknownTag(word))?;
                if expected == 0 {
                    return TelemetryMessage::decode(word, &[]).map(Some);
                }
                self.tag = word;
                self.expected = expected;
                self.payload.clear();
                self.state = DecodeState::ReadingPayload;
                Ok(None)
            }
            DecodeState::ReadingPayload => {
                // expected never exceeds MAX_PAYLOAD_WORDS
                let _ = self.payload.push(word);
                if self.payload.len() < self.expected {
                    return Ok(None);
                }
                self.state = DecodeState::AwaitingTag;
                TelemetryMessage::decode(self.tag, &self.payload).map(Some)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{WeatherUpdate, TAG_DECREASE_REFRESH, TAG_WEATHER_UPDATE};
    use proptest::prelude::*;

    fn sample_update() -> TelemetryMessage {
        TelemetryMessage::WeatherUpdate(WeatherUpdate {
            co2: 650,
            temperature: -3.75,
            humidity: 88.0,
            aux_temperature: 30.5,
        })
    }

    #[test]
    fn test_zero_payload_completes_on_tag() {
        let mut decoder = MessageDecoder::new();
        assert_eq!(
            decoder.feed(TAG_DECREASE_REFRESH),
            Ok(Some(TelemetryMessage::DecreaseRefreshInterval))
        );
        assert!(!decoder.in_message());
    }

    #[test]
    fn test_payload_consumed_before_next_tag() {
        let mut decoder = MessageDecoder::new();
        let words = sample_update().encode();

        for &w in &words[..words.len() - 1] {
            assert_eq!(decoder.feed(w), Ok(None));
            assert!(decoder.in_message());
        }
        assert_eq!(decoder.feed(words[words.len() - 1]), Ok(Some(sample_update())));

        // A payload word equal to a tag value is still payload
        let mut decoder = MessageDecoder::new();
        assert_eq!(decoder.feed(TAG_WEATHER_UPDATE), Ok(None));
        assert_eq!(decoder.feed(TAG_DECREASE_REFRESH), Ok(None));
        assert!(decoder.in_message());
    }

    #[test]
    fn test_unknown_tag_is_error() {
        let mut decoder = MessageDecoder::new();
        assert_eq!(decoder.feed(0xDEAD_BEEF), Err(ProtocolError::UnknownTag(0xDEAD_BEEF)));
        assert_eq!(decoder.feed(0), Err(ProtocolError::UnknownTag(0)));
    }

    #[test]
    fn test_back_to_back_messages() {
        let mut decoder = MessageDecoder::new();
        let mut out = heapless::Vec::<TelemetryMessage, 4>::new();
        let stream = [
            sample_update().encode(),
            TelemetryMessage::IncreaseRefreshInterval.encode(),
            sample_update().encode(),
        ];
        for words in stream.iter() {
            for &w in words.iter() {
                if let Some(msg) = decoder.feed(w).unwrap() {
                    out.push(msg).unwrap();
                }
            }
        }
        assert_eq!(
            out.as_slice(),
            &[
                sample_update(),
                TelemetryMessage::IncreaseRefreshInterval,
                sample_update()
            ]
        );
    }

    proptest! {
        #[test]
        fn test_every_message_needs_exactly_its_words(
            co2 in any::<u16>(),
            temp in -40.0f32..125.0,
            hum in 0.0f32..100.0,
            pick in 0u8..4,
        ) {
            let msg = match pick {
                0 => TelemetryMessage::WeatherUpdate(WeatherUpdate {
                    co2, temperature: temp, humidity: hum, aux_temperature: temp,
                }),
                1 => TelemetryMessage::IncreaseRefreshInterval,
                2 => TelemetryMessage::DecreaseRefreshInterval,
                _ => TelemetryMessage::SwitchScanMode,
            };
            let words = msg.encode();
            let mut decoder = MessageDecoder::new();
            for (i, &w) in words.iter().enumerate() {
                let result = decoder.feed(w).unwrap();
                if i + 1 < words.len() {
                    prop_assert_eq!(result, None);
                } else {
                    prop_assert_eq!(result, Some(msg));
                }
            }
        }
    }
}
