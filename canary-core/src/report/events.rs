//! Events that drive the report cycle

/// Inputs to [`ReportCycle::transition`](super::ReportCycle::transition)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportEvent {
    /// The host loop asked for a report
    ReportRequested {
        /// Broker connection state at the time of the request
        connected: bool,
    },
    /// Broker connection established
    Connected,
    /// Broker connection lost
    Disconnected,
    /// The in-flight publish finished, successfully or not
    PublishCompleted,
}
