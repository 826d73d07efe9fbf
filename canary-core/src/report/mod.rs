//! Report cycle state machine and sequencer
//!
//! A report publishes three metrics one after another, each waiting for
//! the broker's completion before the next is sent. At most one cycle is
//! in flight system-wide.

pub mod events;
pub mod machine;
pub mod sequencer;

pub use events::ReportEvent;
pub use machine::{Metric, ReportCycle};
pub use sequencer::{ReportSequencer, MAX_PAYLOAD_LEN, MAX_TOPIC_LEN};
