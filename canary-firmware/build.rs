//! Build script for canary-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml and embeds it as a postcard blob

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use canary_core::config::DeviceConfig;

/// Top-level tables accepted in device.toml
const SECTIONS: [&str; 4] = ["sensor", "display", "report", "network"];

fn main() {
    setup_linker();
    build_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse and validate device.toml, then write `device_config.bin` to OUT_DIR
fn build_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");
    if !config_path.exists() {
        config_error(
            "device.toml not found!",
            &[
                "The firmware requires a device.toml configuration file.".to_string(),
                "Please create one in the canary-firmware directory.".to_string(),
            ],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => config_error("Failed to read device.toml", &[e.to_string()]),
    };

    let value: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => config_error(
            "Invalid TOML syntax in device.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    validate_sections(&value);

    let config: DeviceConfig = match value.try_into() {
        Ok(config) => config,
        Err(e) => config_error(
            "Invalid value in device.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    if let Err(e) = config.validate() {
        config_error("Invalid device configuration", &[e.to_string()]);
    }

    if config.network.ssid.is_empty() {
        println!("cargo:warning=device.toml has no [network] ssid, reports will stay pending");
    }

    let mut buf = [0u8; 1024];
    let blob = match config.to_postcard(&mut buf) {
        Ok(blob) => blob,
        Err(e) => config_error("Failed to encode device configuration", &[e.to_string()]),
    };

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("device_config.bin"), blob).unwrap();

    println!("cargo:warning=device.toml validated successfully");
}

/// Reject unknown top-level tables, which serde would silently ignore
fn validate_sections(value: &toml::Value) {
    let table = match value.as_table() {
        Some(t) => t,
        None => return,
    };

    let errors: Vec<String> = table
        .iter()
        .filter_map(|(name, section)| {
            if !SECTIONS.contains(&name.as_str()) {
                Some(format!("Unknown section [{}]", name))
            } else if !section.is_table() {
                Some(format!("[{}] must be a table", name))
            } else {
                None
            }
        })
        .collect();

    if !errors.is_empty() {
        config_error("Invalid sections in device.toml", &errors);
    }
}

/// Abort the build with a boxed error message
fn config_error(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(lines)
    );
}

/// Format error message lines with box drawing
fn format_error_lines(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| {
            let truncated = if line.chars().count() > 62 {
                format!("{}...", line.chars().take(59).collect::<String>())
            } else {
                line.clone()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
