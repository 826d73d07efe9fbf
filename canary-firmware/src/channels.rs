//! Inter-task communication channels
//!
//! Defines the statics shared between core0 tasks. The telemetry channel
//! between the two cores is not a static here: `main` builds it once and
//! hands its two ends to the acquisition task and the render loop.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use canary_core::traits::Reading;
use canary_protocol::link::Line;
use canary_protocol::{LinkEvent, TelemetryChannel, TelemetryReceiver, TelemetrySender};

/// Words in flight from core0 to core1 (several full messages)
const TELEMETRY_WORDS: usize = 32;

/// Capacity for button actions
const ACTION_CHANNEL_SIZE: usize = 4;

/// Capacity for co-processor events
const LINK_EVENT_CHANNEL_SIZE: usize = 8;

/// Capacity for outgoing co-processor lines
const LINK_OUTBOX_SIZE: usize = 4;

/// Request raised by a button press
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum ButtonAction {
    /// Show the next sensor
    SwitchDisplay,
    /// Toggle the display scan mode
    SwitchScanMode,
    /// Dim the display
    IncreaseRefreshInterval,
    /// Brighten the display
    DecreaseRefreshInterval,
}

/// Acquisition (core0) to render (core1) telemetry
pub type Telemetry = TelemetryChannel<CriticalSectionRawMutex, TELEMETRY_WORDS>;

/// Producer end, owned by the acquisition task
pub type TelemetryTx = TelemetrySender<'static, CriticalSectionRawMutex, TELEMETRY_WORDS>;

/// Consumer end, owned by the render loop
pub type TelemetryRx = TelemetryReceiver<'static, CriticalSectionRawMutex, TELEMETRY_WORDS>;

/// Button presses, consumed by the acquisition task
pub static BUTTON_ACTIONS: Channel<CriticalSectionRawMutex, ButtonAction, ACTION_CHANNEL_SIZE> =
    Channel::new();

/// Scheduled report requests with the reading to publish
pub static REPORT_REQUEST: Signal<CriticalSectionRawMutex, Reading> = Signal::new();

/// Events parsed from the co-processor link
pub static LINK_EVENTS: Channel<CriticalSectionRawMutex, LinkEvent, LINK_EVENT_CHANNEL_SIZE> =
    Channel::new();

/// Encoded lines waiting to be written to the co-processor
pub static LINK_OUTBOX: Channel<CriticalSectionRawMutex, Line, LINK_OUTBOX_SIZE> = Channel::new();
