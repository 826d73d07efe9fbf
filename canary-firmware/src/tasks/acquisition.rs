//! Acquisition task
//!
//! Ticks the aggregator, forwards dashboard updates to core1 and schedules
//! reports. This task is the only producer on the telemetry channel, so
//! button requests for core1 are routed through it.

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_time::{Duration, Instant, Ticker};

use canary_core::config::DeviceConfig;
use canary_core::weather::Aggregator;
use canary_protocol::TelemetryMessage;

use crate::channels::{ButtonAction, TelemetryTx, BUTTON_ACTIONS, REPORT_REQUEST};
use crate::SensorDriver;

/// Sensors in display routing order
pub type StationAggregator = Aggregator<SensorDriver, 1>;

/// RP2040 on-die sensor: 0.706 V at 27 °C, -1.721 mV/°C
fn board_temperature(raw: u16) -> f32 {
    let volts = raw as f32 * 3.3 / 4096.0;
    27.0 - (volts - 0.706) / 0.001721
}

#[embassy_executor::task]
pub async fn acquisition_task(
    mut aggregator: StationAggregator,
    sender: TelemetryTx,
    mut adc: Adc<'static, Async>,
    mut temp_sensor: Channel<'static>,
    config: &'static DeviceConfig,
) {
    info!("Acquisition task started");

    let mut ticker = Ticker::every(Duration::from_millis(config.sensor.tick_interval_ms as u64));
    let rotate_ms = config.display.rotate_interval_ms as u64;
    let report_ms = config.report.interval_ms as u64;

    let mut latest_ms = 0;
    let mut last_rotate_ms = 0;
    let mut next_report_ms = report_ms;
    let mut aux_temperature = 0.0;

    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis();

        let oldest_ms = aggregator.tick(now_ms);
        let newest_ms = aggregator
            .slots()
            .iter()
            .map(|s| s.timestamp_ms())
            .max()
            .unwrap_or(0);
        let mut changed = newest_ms != latest_ms;
        if changed {
            latest_ms = newest_ms;
            debug!("Oldest reading is {} ms old", now_ms - oldest_ms);
        }

        while let Ok(action) = BUTTON_ACTIONS.try_receive() {
            debug!("Button action {:?}", action);
            match action {
                ButtonAction::SwitchDisplay => {
                    aggregator.switch_display();
                    last_rotate_ms = now_ms;
                    changed = true;
                }
                ButtonAction::SwitchScanMode => {
                    sender.send_async(&TelemetryMessage::SwitchScanMode).await;
                }
                ButtonAction::IncreaseRefreshInterval => {
                    sender
                        .send_async(&TelemetryMessage::IncreaseRefreshInterval)
                        .await;
                }
                ButtonAction::DecreaseRefreshInterval => {
                    sender
                        .send_async(&TelemetryMessage::DecreaseRefreshInterval)
                        .await;
                }
            }
        }

        if rotate_ms > 0 && now_ms - last_rotate_ms >= rotate_ms && aggregator.slots().len() > 1 {
            aggregator.switch_display();
            last_rotate_ms = now_ms;
            changed = true;
        }

        if changed {
            match adc.read(&mut temp_sensor).await {
                Ok(raw) => aux_temperature = board_temperature(raw),
                Err(e) => warn!("Board temperature read failed: {:?}", e),
            }
            let update = aggregator.weather_update(aux_temperature);
            sender
                .send_async(&TelemetryMessage::WeatherUpdate(update))
                .await;
        }

        if now_ms >= next_report_ms {
            next_report_ms = now_ms + report_ms;
            let reading = aggregator.current();
            if reading.has_co2() {
                REPORT_REQUEST.signal(reading);
            } else {
                debug!("No reading yet, report skipped");
            }
        }
    }
}
