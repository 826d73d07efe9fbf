//! Canary Telemetry Protocol
//!
//! This crate defines the word-oriented protocol that carries readings and
//! control requests from the acquisition core to the render core. The two
//! cores share nothing else; this channel is the only cross-core
//! synchronization point.
//!
//! # Protocol Overview
//!
//! Every message is a tag word followed by a tag-defined number of payload
//! words. There is no length prefix and no checksum:
//! ```text
//! ┌───────┬──────────────────────────────┐
//! │ TAG   │ PAYLOAD                      │
//! │ 1 word│ payload_len(TAG) words       │
//! └───────┴──────────────────────────────┘
//! ```
//!
//! Floats travel as their IEEE-754 bit patterns, so values arrive bit-for-bit.
//! The tag table is a closed contract: an unknown tag means the two sides
//! disagree about the protocol and the stream cannot be resynchronized.
//!
//! The [`link`] module holds the unrelated line protocol spoken with the
//! network co-processor over UART.

#![no_std]
#![deny(unsafe_code)]

pub mod channel;
pub mod decoder;
pub mod link;
pub mod messages;

pub use channel::{TelemetryChannel, TelemetryReceiver, TelemetrySender, RECEIVER_POLL_INTERVAL_MS};
pub use decoder::MessageDecoder;
pub use link::{LineParser, LinkCommand, LinkError, LinkEvent, MAX_LINE_LEN};
pub use messages::{
    payload_len, ProtocolError, TelemetryMessage, WeatherUpdate, MAX_MESSAGE_WORDS,
    MAX_PAYLOAD_WORDS,
};
