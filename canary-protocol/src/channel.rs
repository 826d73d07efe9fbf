//! Single-producer / single-consumer word transport between the two cores
//!
//! The channel is a bounded FIFO of `u32` words built on
//! [`embassy_sync::channel::Channel`]. The sender pushes every word of a
//! message in order and waits when the queue is full. The receiver never
//! waits for the first word of a message; it checks for one at a fixed
//! cadence. Once it has taken a tag word it waits for the whole payload.
//!
//! # Producer stalls
//!
//! A message is not atomic. If the producer stops after pushing a tag word
//! and before pushing its payload, the receiver waits inside
//! [`TelemetryReceiver::poll`] until the payload arrives. Producers must push
//! a message in one go and must not be preempted indefinitely in between.

use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;

use crate::decoder::MessageDecoder;
use crate::messages::{ProtocolError, TelemetryMessage};

/// Receiver idle cadence: how long it waits after finding the queue empty
pub const RECEIVER_POLL_INTERVAL_MS: u64 = 5;

/// Bounded word queue shared by the acquisition and render contexts
///
/// Construct once and [`split`](Self::split) it into the producer and
/// consumer handles. Splitting takes the channel mutably, so a channel
/// placed in a `StaticCell` yields exactly one pair of `'static` handles.
/// Taking more than one sender interleaves words and breaks the stream.
pub struct TelemetryChannel<M: RawMutex, const N: usize> {
    words: Channel<M, u32, N>,
}

impl<M: RawMutex, const N: usize> Default for TelemetryChannel<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> TelemetryChannel<M, N> {
    /// Create an empty channel
    pub const fn new() -> Self {
        Self {
            words: Channel::new(),
        }
    }

    /// Hand out the single producer and consumer pair
    ///
    /// The receiver polls at [`RECEIVER_POLL_INTERVAL_MS`].
    pub fn split(&mut self) -> (TelemetrySender<'_, M, N>, TelemetryReceiver<'_, M, N>) {
        let this: &Self = self;
        (this.sender(), this.receiver())
    }

    /// Producer handle
    pub fn sender(&self) -> TelemetrySender<'_, M, N> {
        TelemetrySender { channel: self }
    }

    /// Consumer handle, polling at [`RECEIVER_POLL_INTERVAL_MS`]
    pub fn receiver(&self) -> TelemetryReceiver<'_, M, N> {
        self.receiver_with_interval(RECEIVER_POLL_INTERVAL_MS)
    }

    /// Consumer handle with a custom idle cadence
    pub fn receiver_with_interval(&self, interval_ms: u64) -> TelemetryReceiver<'_, M, N> {
        TelemetryReceiver {
            channel: self,
            decoder: MessageDecoder::new(),
            next_poll_ms: 0,
            interval_ms,
        }
    }
}

/// Producer side of a [`TelemetryChannel`]
pub struct TelemetrySender<'a, M: RawMutex, const N: usize> {
    channel: &'a TelemetryChannel<M, N>,
}

impl<'a, M: RawMutex, const N: usize> TelemetrySender<'a, M, N> {
    /// Push every word of `msg`, spinning while the queue is full
    pub fn send(&self, msg: &TelemetryMessage) {
        for &word in msg.encode().iter() {
            block_on(self.channel.words.send(word));
        }
    }

    /// Push every word of `msg`, yielding to the executor while the queue is full
    pub async fn send_async(&self, msg: &TelemetryMessage) {
        for &word in msg.encode().iter() {
            self.channel.words.send(word).await;
        }
    }
}

/// Consumer side of a [`TelemetryChannel`]
pub struct TelemetryReceiver<'a, M: RawMutex, const N: usize> {
    channel: &'a TelemetryChannel<M, N>,
    decoder: MessageDecoder,
    next_poll_ms: u64,
    interval_ms: u64,
}

impl<'a, M: RawMutex, const N: usize> TelemetryReceiver<'a, M, N> {
    /// Try to take one message
    ///
    /// Does nothing before the idle cadence has elapsed. Otherwise takes a
    /// tag word if one is queued; if none is, returns `Ok(None)` and arms
    /// the cadence. After a tag has been taken, waits for its full payload.
    ///
    /// `Err` means the stream broke the tag contract. The caller must treat
    /// it as fatal; the stream position is lost.
    pub fn poll(&mut self, now_ms: u64) -> Result<Option<TelemetryMessage>, ProtocolError> {
        if now_ms < self.next_poll_ms {
            return Ok(None);
        }

        let Ok(tag) = self.channel.words.try_receive() else {
            self.next_poll_ms = now_ms.saturating_add(self.interval_ms);
            return Ok(None);
        };

        let mut decoded = self.decoder.feed(tag)?;
        while decoded.is_none() {
            let word = block_on(self.channel.words.receive());
            decoded = self.decoder.feed(word)?;
        }
        Ok(decoded)
    }
}
