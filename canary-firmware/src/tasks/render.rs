//! Render loop
//!
//! Runs alone on core1 as a plain loop: scan the display and poll the
//! telemetry channel. It never awaits, so no executor is needed there.

use core::convert::Infallible;

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::Instant;

use canary_core::weather::show_weather;
use canary_drivers::display::MultiDisplay;
use canary_protocol::TelemetryMessage;

use crate::channels::TelemetryRx;

/// Display units on the reference board
pub const DISPLAY_UNITS: usize = 4;

/// The dashboard renderer
pub type Dashboard = MultiDisplay<Output<'static>, DISPLAY_UNITS>;

fn pin_ok<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Core1 entry point
pub fn render_loop(mut display: Dashboard, mut receiver: TelemetryRx) -> ! {
    info!("Render loop started");

    pin_ok(display.blank());

    loop {
        let now = Instant::now();
        pin_ok(display.refresh(now.as_micros()));

        match receiver.poll(now.as_millis()) {
            Ok(Some(TelemetryMessage::WeatherUpdate(update))) => {
                show_weather(&mut display, &update);
            }
            Ok(Some(TelemetryMessage::IncreaseRefreshInterval)) => {
                let off_us = display.increase_off_interval();
                debug!("Display off interval {} us", off_us);
            }
            Ok(Some(TelemetryMessage::DecreaseRefreshInterval)) => {
                let off_us = display.decrease_off_interval();
                debug!("Display off interval {} us", off_us);
            }
            Ok(Some(TelemetryMessage::SwitchScanMode)) => {
                let mode = display.switch_mode();
                info!("Display scan mode {:?}", mode);
            }
            Ok(None) => {}
            Err(e) => defmt::panic!("Telemetry stream corrupted: {:?}", e),
        }
    }
}
