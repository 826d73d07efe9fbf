//! Network publish capability

/// Errors reported by the network layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PublishError {
    /// Not connected to the broker
    NotConnected,
    /// Outgoing queue is full
    Busy,
    /// Topic or payload cannot be carried by the transport
    Invalid,
    /// Broker or transport reported a failure status
    Rejected(i8),
}

/// Identifier the network layer assigns to a queued publish
pub type PublishId = u16;

/// Trait for submitting publishes to a message broker
///
/// Submission is asynchronous: `publish` only queues the message and
/// returns its id. The outcome is reported later, tagged with that id,
/// through
/// [`ReportSequencer::on_publish_complete`](crate::report::ReportSequencer::on_publish_complete).
pub trait Publisher {
    /// Queue a publish of `payload` on `topic`
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<PublishId, PublishError>;
}
