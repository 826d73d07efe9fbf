//! Canary - CO2 Telemetry Appliance Firmware
//!
//! Main firmware binary for the Raspberry Pi Pico (RP2040).
//!
//! Core0 runs the embassy tasks: sensor acquisition, report sequencing, the
//! network co-processor link and the buttons. Core1 does nothing but scan
//! the seven-segment dashboard. The telemetry channel is the only thing the
//! two cores share.

#![no_std]
#![no_main]

use core::fmt::Write as _;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::{I2C0, UART0};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::{Delay, Instant};
use heapless::String;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use canary_core::config::{DeviceConfig, MAX_CLIENT_ID_LEN};
use canary_core::report::ReportSequencer;
use canary_core::weather::Aggregator;
use canary_drivers::display::MultiDisplay;
use canary_drivers::input::Button;
use canary_drivers::sensor::{Scd4x, Scd4xI2c};

use crate::channels::Telemetry;
use crate::publisher::LinkPublisher;

mod channels;
mod config;
mod publisher;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

/// SCD4x on I2C0 with blocking transfers
pub type SensorDriver = Scd4x<Scd4xI2c<I2c<'static, I2C0, i2c::Blocking>, Delay>, Delay>;

/// Client id prefix, a dash and 12 hex digits of the sensor serial
const CLIENT_ID_LEN: usize = MAX_CLIENT_ID_LEN + 13;

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// Configuration shared with tasks by reference
static DEVICE_CONFIG: StaticCell<DeviceConfig> = StaticCell::new();
static CLIENT_ID: StaticCell<String<CLIENT_ID_LEN>> = StaticCell::new();

// The only cross-core state; split once into its two ends below
static TELEMETRY: StaticCell<Telemetry> = StaticCell::new();

static CORE1_STACK: StaticCell<Stack<4096>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Canary firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static DeviceConfig = DEVICE_CONFIG.init(config::load());
    let (telemetry_tx, telemetry_rx) = TELEMETRY.init(Telemetry::new()).split();

    // Dashboard: four 16-bit shift register chains sharing clock and latch
    // Pin assignment: CLK=GPIO11, LATCH=GPIO12, DATA=GPIO16/13/19/10 (unit 0..3)
    let display = MultiDisplay::new(
        [
            Output::new(p.PIN_16, Level::Low),
            Output::new(p.PIN_13, Level::Low),
            Output::new(p.PIN_19, Level::Low),
            Output::new(p.PIN_10, Level::Low),
        ],
        Output::new(p.PIN_11, Level::Low),
        Output::new(p.PIN_12, Level::Low),
        &config.display,
    );
    spawn_core1(p.CORE1, CORE1_STACK.init(Stack::new()), move || {
        tasks::render_loop(display, telemetry_rx)
    });
    info!("Core1 renderer launched");

    // SCD4x on I2C0 (SDA=GPIO4, SCL=GPIO5), 100 kHz
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c::Config::default());
    let mut scd = Scd4x::new(Scd4xI2c::new(i2c, Delay), Delay, config.sensor.clone());
    let serial = scd.begin(Instant::now().as_millis());
    let aggregator = Aggregator::new([scd]);
    info!("Sensor initialized");

    // On-die temperature sensor for the board temperature unit
    let adc = Adc::new(p.ADC, Irqs, adc::Config::default());
    let temp_sensor = adc::Channel::new_temp_sensor(p.ADC_TEMP_SENSOR);

    // Network co-processor link on UART0 (TX=GPIO0, RX=GPIO1), 115200 baud
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    info!("UART initialized for co-processor link");

    let client_id = CLIENT_ID.init(String::new());
    let _ = write!(
        client_id,
        "{}-{:012x}",
        config.network.client_id_prefix.as_str(),
        serial.unwrap_or(0)
    );
    let client_id: &'static str = client_id;

    // Front panel buttons, active low (GPIO7, GPIO8, GPIO9)
    let buttons = [
        Button::new(Input::new(p.PIN_7, Pull::Up)),
        Button::new(Input::new(p.PIN_8, Pull::Up)),
        Button::new(Input::new(p.PIN_9, Pull::Up)),
    ];

    let sequencer = ReportSequencer::new(
        LinkPublisher::new(config.report.qos),
        &config.report.topic_prefix,
    );

    // Spawn tasks
    spawner.spawn(tasks::link_rx_task(rx)).unwrap();
    spawner
        .spawn(tasks::link_tx_task(tx, &config.network, client_id))
        .unwrap();
    spawner
        .spawn(tasks::report_task(sequencer, &config.network, client_id))
        .unwrap();
    spawner
        .spawn(tasks::acquisition_task(aggregator, telemetry_tx, adc, temp_sensor, config))
        .unwrap();
    spawner.spawn(tasks::buttons_task(buttons)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
