//! Report sequencer
//!
//! Drives [`ReportCycle`] and performs its side effects: snapshotting the
//! reading, formatting payloads and submitting publishes. The network layer
//! reports back through `on_connected`, `on_disconnected` and
//! `on_publish_complete`; the sequencer never registers callbacks itself.
//!
//! A failed publish, whether rejected at submission or reported failed on
//! completion, is logged and the cycle moves on to the next metric. There is
//! no retry inside a cycle; the next scheduled report is the retry.
//!
//! Completions carry the id returned by [`Publisher::publish`]. Only the
//! completion of the publish in flight advances the cycle, so an ack for a
//! publish abandoned by a disconnect cannot be taken for a later one.

use core::fmt::Write;

use heapless::String;

use super::events::ReportEvent;
use super::machine::{Metric, ReportCycle};
use crate::config::{fixed_str, MAX_TOPIC_PREFIX_LEN};
use crate::traits::{PublishError, PublishId, Publisher, Reading};

/// Longest topic: prefix plus the longest metric name
pub const MAX_TOPIC_LEN: usize = MAX_TOPIC_PREFIX_LEN + 16;

/// Longest payload: any `f32` with two decimals and a sign
pub const MAX_PAYLOAD_LEN: usize = 48;

/// Chains the three metric publishes of a report
pub struct ReportSequencer<P: Publisher> {
    publisher: P,
    state: ReportCycle,
    in_flight: Option<PublishId>,
    connected: bool,
    snapshot: Reading,
    topic_prefix: String<MAX_TOPIC_PREFIX_LEN>,
}

impl<P: Publisher> ReportSequencer<P> {
    /// Create an idle, disconnected sequencer publishing under `topic_prefix`
    pub fn new(publisher: P, topic_prefix: &str) -> Self {
        Self {
            publisher,
            state: ReportCycle::Idle,
            in_flight: None,
            connected: false,
            snapshot: Reading::default(),
            topic_prefix: fixed_str(topic_prefix),
        }
    }

    /// Current cycle state
    pub fn state(&self) -> ReportCycle {
        self.state
    }

    /// Id of the publish awaiting completion
    pub fn in_flight(&self) -> Option<PublishId> {
        self.in_flight
    }

    /// Last known broker connection state
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Reading captured by the current or last cycle
    pub fn snapshot(&self) -> Reading {
        self.snapshot
    }

    /// The wrapped publisher
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Mutable access to the wrapped publisher
    pub fn publisher_mut(&mut self) -> &mut P {
        &mut self.publisher
    }

    /// Start a report of `reading`
    ///
    /// Returns `false` if a cycle is already publishing or pending; the
    /// request is dropped in that case.
    pub fn request_report(&mut self, reading: Reading) -> bool {
        if self.state.is_busy() {
            debug!("Report request dropped, cycle busy ({:?})", self.state);
            return false;
        }
        self.snapshot = reading;
        if !self.connected {
            info!("Broker not connected, report pending");
        }
        self.advance(ReportEvent::ReportRequested {
            connected: self.connected,
        });
        true
    }

    /// The broker connection is up
    pub fn on_connected(&mut self) {
        self.connected = true;
        if self.state == ReportCycle::Pending {
            info!("Broker connected, starting pending report");
        }
        self.advance(ReportEvent::Connected);
    }

    /// The broker connection is down
    pub fn on_disconnected(&mut self) {
        self.connected = false;
        self.in_flight = None;
        if self.state.metric().is_some() {
            warn!("Broker disconnected during report ({:?})", self.state);
        }
        self.advance(ReportEvent::Disconnected);
    }

    /// The publish `id` finished
    ///
    /// Ignored unless `id` is the publish in flight.
    pub fn on_publish_complete(&mut self, id: PublishId, result: Result<(), PublishError>) {
        if self.in_flight != Some(id) {
            debug!("Completion of publish {} ignored, not in flight", id);
            return;
        }
        self.in_flight = None;
        let Some(metric) = self.state.metric() else {
            return;
        };
        if let Err(e) = result {
            warn!("Publish of {} failed: {:?}", metric.name(), e);
        }
        self.advance(ReportEvent::PublishCompleted);
    }

    fn advance(&mut self, event: ReportEvent) {
        let previous = self.state;
        self.state = self.state.transition(event);
        if self.state != previous {
            self.enter_state();
        }
    }

    /// Submit the publish of the state just entered
    fn enter_state(&mut self) {
        while let Some(metric) = self.state.metric() {
            match self.submit(metric) {
                Ok(id) => {
                    self.in_flight = Some(id);
                    return;
                }
                Err(e) => {
                    warn!("Publish of {} not submitted: {:?}", metric.name(), e);
                    self.state = self.state.transition(ReportEvent::PublishCompleted);
                }
            }
        }
    }

    fn submit(&mut self, metric: Metric) -> Result<PublishId, PublishError> {
        // Both buffers are sized for their worst case, so writes cannot fail
        let mut topic: String<MAX_TOPIC_LEN> = String::new();
        let _ = topic.push_str(&self.topic_prefix);
        let _ = topic.push_str(metric.name());

        let mut payload: String<MAX_PAYLOAD_LEN> = String::new();
        let _ = match metric {
            Metric::Co2 => write!(payload, "{}", self.snapshot.co2),
            Metric::Temperature => write!(payload, "{:.2}", self.snapshot.temperature),
            Metric::Humidity => write!(payload, "{:.2}", self.snapshot.humidity),
        };

        info!("Publishing {} = {}", topic.as_str(), payload.as_str());
        self.publisher.publish(&topic, payload.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    #[derive(Default)]
    struct RecordingPublisher {
        sent: Vec<(String<MAX_TOPIC_LEN>, String<MAX_PAYLOAD_LEN>), 16>,
        reject: bool,
    }

    impl Publisher for RecordingPublisher {
        fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<PublishId, PublishError> {
            if self.reject {
                return Err(PublishError::Busy);
            }
            let payload = core::str::from_utf8(payload).unwrap();
            self.sent
                .push((fixed_str(topic), fixed_str(payload)))
                .unwrap();
            Ok(self.sent.len() as PublishId)
        }
    }

    fn reading() -> Reading {
        Reading {
            co2: 812,
            temperature: 21.456,
            humidity: 40.5,
        }
    }

    fn connected() -> ReportSequencer<RecordingPublisher> {
        let mut seq = ReportSequencer::new(RecordingPublisher::default(), "home/weather_station/");
        seq.on_connected();
        seq
    }

    fn sent(seq: &ReportSequencer<RecordingPublisher>) -> usize {
        seq.publisher().sent.len()
    }

    /// Complete the publish in flight
    fn ack(seq: &mut ReportSequencer<RecordingPublisher>, result: Result<(), PublishError>) {
        let id = seq.in_flight().unwrap();
        seq.on_publish_complete(id, result);
    }

    #[test]
    fn test_full_cycle_publishes_three_metrics() {
        let mut seq = connected();
        assert!(seq.request_report(reading()));
        assert_eq!(seq.state(), ReportCycle::PublishingCo2);
        ack(&mut seq, Ok(()));
        ack(&mut seq, Ok(()));
        ack(&mut seq, Ok(()));
        assert_eq!(seq.state(), ReportCycle::Idle);

        let sent = &seq.publisher().sent;
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].0.as_str(), "home/weather_station/co2");
        assert_eq!(sent[0].1.as_str(), "812");
        assert_eq!(sent[1].0.as_str(), "home/weather_station/temperature");
        assert_eq!(sent[1].1.as_str(), "21.46");
        assert_eq!(sent[2].0.as_str(), "home/weather_station/humidity");
        assert_eq!(sent[2].1.as_str(), "40.50");
    }

    #[test]
    fn test_publishes_wait_for_completion() {
        let mut seq = connected();
        seq.request_report(reading());
        assert_eq!(sent(&seq), 1);
        ack(&mut seq, Ok(()));
        assert_eq!(sent(&seq), 2);
    }

    #[test]
    fn test_single_flight() {
        let mut seq = connected();
        seq.request_report(reading());
        ack(&mut seq, Ok(()));
        assert_eq!(seq.state(), ReportCycle::PublishingTemperature);

        let other = Reading {
            co2: 2000,
            ..reading()
        };
        assert!(!seq.request_report(other));
        assert_eq!(seq.state(), ReportCycle::PublishingTemperature);
        assert_eq!(sent(&seq), 2);
        assert_eq!(seq.snapshot().co2, 812);
    }

    #[test]
    fn test_pending_promoted_on_connect() {
        let mut seq = ReportSequencer::new(RecordingPublisher::default(), "t/");
        assert!(seq.request_report(reading()));
        assert_eq!(seq.state(), ReportCycle::Pending);
        assert_eq!(sent(&seq), 0);

        // Dropped while pending
        assert!(!seq.request_report(reading()));

        seq.on_connected();
        assert_eq!(seq.state(), ReportCycle::PublishingCo2);
        assert_eq!(seq.publisher().sent[0].0.as_str(), "t/co2");
    }

    #[test]
    fn test_failed_completion_still_advances() {
        let mut seq = connected();
        seq.request_report(reading());
        ack(&mut seq, Err(PublishError::Rejected(-1)));
        assert_eq!(seq.state(), ReportCycle::PublishingTemperature);
        ack(&mut seq, Err(PublishError::Rejected(-1)));
        ack(&mut seq, Ok(()));
        assert_eq!(seq.state(), ReportCycle::Idle);
        assert_eq!(sent(&seq), 3);
    }

    #[test]
    fn test_rejected_submission_runs_cycle_to_idle() {
        let mut seq = connected();
        seq.publisher_mut().reject = true;
        assert!(seq.request_report(reading()));
        assert_eq!(seq.state(), ReportCycle::Idle);

        // Next request is accepted again
        seq.publisher_mut().reject = false;
        assert!(seq.request_report(reading()));
        assert_eq!(seq.state(), ReportCycle::PublishingCo2);
    }

    #[test]
    fn test_disconnect_mid_cycle() {
        let mut seq = connected();
        seq.request_report(reading());
        seq.on_disconnected();
        assert_eq!(seq.state(), ReportCycle::Idle);
        assert!(!seq.is_connected());

        // Late completion is ignored
        seq.on_publish_complete(1, Ok(()));
        assert_eq!(seq.state(), ReportCycle::Idle);
        assert_eq!(sent(&seq), 1);

        assert!(seq.request_report(reading()));
        assert_eq!(seq.state(), ReportCycle::Pending);
    }

    #[test]
    fn test_stale_ack_after_reconnect_is_ignored() {
        let mut seq = connected();
        seq.request_report(reading());
        let abandoned = seq.in_flight().unwrap();
        seq.on_disconnected();
        assert_eq!(seq.in_flight(), None);

        seq.on_connected();
        seq.request_report(reading());
        assert_eq!(seq.state(), ReportCycle::PublishingCo2);
        let current = seq.in_flight().unwrap();
        assert_ne!(current, abandoned);

        seq.on_publish_complete(abandoned, Ok(()));
        assert_eq!(seq.state(), ReportCycle::PublishingCo2);
        assert_eq!(sent(&seq), 2);

        seq.on_publish_complete(current, Ok(()));
        assert_eq!(seq.state(), ReportCycle::PublishingTemperature);
    }

    #[test]
    fn test_reconnect_without_pending_is_quiet() {
        let mut seq = connected();
        seq.on_disconnected();
        seq.on_connected();
        assert_eq!(seq.state(), ReportCycle::Idle);
        assert_eq!(sent(&seq), 0);
    }

    #[test]
    fn test_negative_temperature_payload() {
        let mut seq = connected();
        seq.request_report(Reading {
            co2: 400,
            temperature: -3.5,
            humidity: 0.0,
        });
        ack(&mut seq, Ok(()));
        ack(&mut seq, Ok(()));
        let sent = &seq.publisher().sent;
        assert_eq!(sent[1].1.as_str(), "-3.50");
        assert_eq!(sent[2].1.as_str(), "0.00");
    }
}
