//! Report task
//!
//! Owns the [`ReportSequencer`] and feeds it scheduled requests and link
//! events. Also supervises the broker connection: a lost session is
//! re-requested from the co-processor up to `connect_retries` times in a
//! row, after which the firmware halts.

use defmt::*;
use embassy_futures::select::{select, Either};

use canary_core::config::NetworkConfig;
use canary_core::report::ReportSequencer;
use canary_core::traits::PublishError;
use canary_protocol::LinkEvent;

use crate::channels::{LINK_EVENTS, REPORT_REQUEST};
use crate::publisher::LinkPublisher;
use crate::tasks::link::queue_broker;

#[embassy_executor::task]
pub async fn report_task(
    mut sequencer: ReportSequencer<LinkPublisher>,
    network: &'static NetworkConfig,
    client_id: &'static str,
) {
    info!("Report task started");

    let mut failures: u8 = 0;

    loop {
        match select(LINK_EVENTS.receive(), REPORT_REQUEST.wait()).await {
            Either::First(event) => match event {
                LinkEvent::Connected => {
                    info!("Broker connected");
                    failures = 0;
                    sequencer.on_connected();
                }
                LinkEvent::Disconnected => {
                    info!("Broker disconnected");
                    sequencer.on_disconnected();

                    failures = failures.saturating_add(1);
                    if failures > network.connect_retries {
                        defmt::panic!("Broker unreachable after {} attempts", failures);
                    }
                    queue_broker(network, client_id).await;
                }
                LinkEvent::PublishAck { id, status } => {
                    let result = LinkEvent::ack_result(status).map_err(PublishError::Rejected);
                    sequencer.on_publish_complete(id, result);
                }
            },
            Either::Second(reading) => {
                info!("Report requested, co2={}", reading.co2);
                sequencer.request_report(reading);
            }
        }
    }
}
