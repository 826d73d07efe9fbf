//! Network co-processor link tasks
//!
//! The co-processor runs WiFi and the MQTT client; this side only speaks
//! the line protocol from [`canary_protocol::link`] over UART0.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embedded_io_async::{Read, Write};

use canary_core::config::NetworkConfig;
use canary_protocol::{LineParser, LinkCommand};

use crate::channels::{LINK_EVENTS, LINK_OUTBOX};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Queue a broker (re)connect request
pub async fn queue_broker(network: &NetworkConfig, client_id: &str) {
    let command = LinkCommand::Broker {
        host: &network.broker_host,
        port: network.broker_port,
        client_id,
        keep_alive_s: network.keep_alive_s,
        username: &network.username,
        password: &network.broker_password,
    };
    match command.encode() {
        Ok(line) => LINK_OUTBOX.send(line).await,
        Err(e) => warn!("Broker settings cannot be sent: {:?}", e),
    }
}

/// Link RX task - parses event lines from the co-processor
#[embassy_executor::task]
pub async fn link_rx_task(mut rx: BufferedUartRx) {
    info!("Link RX task started");

    let mut parser = LineParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);
                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(event)) => {
                            debug!("Link event: {:?}", event);
                            LINK_EVENTS.send(event).await;
                        }
                        Ok(None) => {}
                        Err(e) => warn!("Link line error: {:?}", e),
                    }
                }
            }
            Ok(_) => {}
            Err(e) => warn!("UART read error: {:?}", e),
        }
    }
}

/// Link TX task - pushes settings once, then drains the outbox
#[embassy_executor::task]
pub async fn link_tx_task(
    mut tx: BufferedUartTx,
    network: &'static NetworkConfig,
    client_id: &'static str,
) {
    info!("Link TX task started");

    let wifi = LinkCommand::Wifi {
        ssid: &network.ssid,
        password: &network.password,
    };
    match wifi.encode() {
        Ok(line) => {
            if let Err(e) = tx.write_all(line.as_bytes()).await {
                warn!("Failed to send WiFi settings: {:?}", e);
            }
        }
        Err(_) => warn!("No usable WiFi credentials configured"),
    }
    queue_broker(network, client_id).await;

    loop {
        let line = LINK_OUTBOX.receive().await;
        trace!("TX: {}", line.as_str());
        if let Err(e) = tx.write_all(line.as_bytes()).await {
            warn!("Failed to send link line: {:?}", e);
        }
    }
}
