//! Button task
//!
//! Polls the three front-panel buttons and turns releases into
//! [`ButtonAction`]s for the acquisition task. A long press on the first
//! button toggles the display scan mode; the others act the same however
//! long they are held.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Instant, Ticker};

use canary_drivers::input::{Button, Press};

use crate::channels::{ButtonAction, BUTTON_ACTIONS};

/// Poll period, longer than the switches bounce
const POLL_INTERVAL_MS: u64 = 20;

/// Short and long press action of each button, in wiring order
const ACTIONS: [(ButtonAction, ButtonAction); 3] = [
    (ButtonAction::SwitchDisplay, ButtonAction::SwitchScanMode),
    (
        ButtonAction::IncreaseRefreshInterval,
        ButtonAction::IncreaseRefreshInterval,
    ),
    (
        ButtonAction::DecreaseRefreshInterval,
        ButtonAction::DecreaseRefreshInterval,
    ),
];

#[embassy_executor::task]
pub async fn buttons_task(mut buttons: [Button<Input<'static>>; 3]) {
    info!("Button task started");

    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));

    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis();

        for (button, (short, long)) in buttons.iter_mut().zip(ACTIONS) {
            if let Ok(Some(press)) = button.poll(now_ms) {
                let action = match press {
                    Press::Short => short,
                    Press::Long => long,
                };
                debug!("Button: {:?}", action);
                if BUTTON_ACTIONS.try_send(action).is_err() {
                    warn!("Action channel full, dropping {:?}", action);
                }
            }
        }
    }
}
