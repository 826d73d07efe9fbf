//! Report cycle states
//!
//! ```text
//!          request (connected)
//!   Idle ───────────────────────► PublishingCo2
//!    │ ▲                               │ completed
//!    │ │                               ▼
//!    │ │                        PublishingTemperature
//!    │ │                               │ completed
//!    │ │         completed             ▼
//!    │ └─────────────────────── PublishingHumidity
//!    │ request (disconnected)          ▲
//!    ▼                                 │
//!  Pending ──── connected ────► PublishingCo2
//! ```
//!
//! Requests outside `Idle` are dropped. Losing the connection in the middle
//! of a cycle abandons it; the next scheduled request starts over.

use super::events::ReportEvent;

/// Metric published in one step of the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Metric {
    Co2,
    Temperature,
    Humidity,
}

impl Metric {
    /// Topic suffix
    pub const fn name(self) -> &'static str {
        match self {
            Metric::Co2 => "co2",
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
        }
    }
}

/// Report cycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportCycle {
    /// No cycle in flight
    #[default]
    Idle,
    /// Requested while disconnected, waiting for the broker
    Pending,
    /// CO2 publish in flight
    PublishingCo2,
    /// Temperature publish in flight
    PublishingTemperature,
    /// Humidity publish in flight
    PublishingHumidity,
}

impl ReportCycle {
    /// Check if a cycle is in flight or waiting
    pub fn is_busy(&self) -> bool {
        !matches!(self, ReportCycle::Idle)
    }

    /// Metric being published in this state
    pub fn metric(&self) -> Option<Metric> {
        match self {
            ReportCycle::PublishingCo2 => Some(Metric::Co2),
            ReportCycle::PublishingTemperature => Some(Metric::Temperature),
            ReportCycle::PublishingHumidity => Some(Metric::Humidity),
            ReportCycle::Idle | ReportCycle::Pending => None,
        }
    }

    /// Process an event and return the next state
    pub fn transition(self, event: ReportEvent) -> Self {
        use ReportCycle::*;
        use ReportEvent::*;

        match (self, event) {
            // Idle transitions
            (Idle, ReportRequested { connected: true }) => PublishingCo2,
            (Idle, ReportRequested { connected: false }) => Pending,

            // Pending transitions
            (Pending, Connected) => PublishingCo2,

            // Publish chain
            (PublishingCo2, PublishCompleted) => PublishingTemperature,
            (PublishingTemperature, PublishCompleted) => PublishingHumidity,
            (PublishingHumidity, PublishCompleted) => Idle,

            // Connection lost mid-cycle
            (PublishingCo2 | PublishingTemperature | PublishingHumidity, Disconnected) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}
