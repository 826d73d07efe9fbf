//! Device configuration
//!
//! build.rs validates device.toml and embeds it as a postcard blob.

use defmt::*;

use canary_core::config::DeviceConfig;

/// Postcard-encoded device.toml
static DEVICE_CONFIG: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/device_config.bin"));

/// Decode the embedded configuration
///
/// Falls back to the defaults if the blob does not decode, which only
/// happens when the firmware and build script disagree on the layout.
pub fn load() -> DeviceConfig {
    match DeviceConfig::from_postcard(DEVICE_CONFIG) {
        Ok(config) => {
            info!("Loaded embedded configuration ({} bytes)", DEVICE_CONFIG.len());
            log_config_summary(&config);
            config
        }
        Err(_) => {
            error!("Embedded configuration is corrupt, using defaults");
            DeviceConfig::default()
        }
    }
}

fn log_config_summary(config: &DeviceConfig) {
    debug!("  poll interval {} ms", config.sensor.poll_interval_ms);
    debug!("  scan mode {:?}", config.display.scan_mode);
    debug!("  report every {} ms", config.report.interval_ms);
    debug!(
        "  broker {}:{}",
        config.network.broker_host.as_str(),
        config.network.broker_port
    );
}
