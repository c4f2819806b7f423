//! Build script for parasol-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates covers.toml at compile time

use std::collections::HashSet;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const STOP_POLICIES: &[&str] = &["stop", "opposite_direction", "open_and_close"];
const COMMANDS: &[&str] = &["open", "close", "stop", "toggle"];
const MAX_TRAVEL_MS: i64 = 3_600_000;

fn main() {
    setup_linker();
    validate_config();
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

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}

/// Validate covers.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=covers.toml");

    let config_path = Path::new("covers.toml");
    if !config_path.exists() {
        fail(
            "covers.toml not found",
            &["The firmware embeds covers.toml from the parasol-firmware directory.".into()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read covers.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in covers.toml",
            &e.to_string().lines().map(str::to_owned).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    let mut pins = HashSet::new();

    let devices = validate_relay_devices(&config, &mut pins, &mut errors);
    let covers = validate_covers(&config, &devices, &mut errors);
    validate_buttons(&config, &covers, &mut pins, &mut errors);

    if covers.is_empty() {
        errors.push("at least one [cover.NAME] section is required".into());
    }

    if !errors.is_empty() {
        fail("Invalid configuration in covers.toml", &errors);
    }
}

/// Device key mapped to its port numbers
type Devices = Vec<(String, Vec<i64>)>;

fn validate_relay_devices(
    config: &toml::Value,
    pins: &mut HashSet<i64>,
    errors: &mut Vec<String>,
) -> Devices {
    let mut devices = Vec::new();
    let Some(table) = config.get("relay_device").and_then(|d| d.as_table()) else {
        return devices;
    };

    for (key, device) in table {
        let Some(device) = device.as_table() else {
            errors.push(format!("[relay_device.{}] must be a table", key));
            continue;
        };

        let mut ports = Vec::new();
        for (port, pin) in device {
            let number = port
                .strip_prefix("port")
                .and_then(|n| n.parse::<i64>().ok());
            let Some(number) = number else {
                errors.push(format!("[relay_device.{}] unknown key '{}'", key, port));
                continue;
            };
            match pin.as_str().and_then(gpio_number) {
                Some(gpio) => {
                    if !pins.insert(gpio) {
                        errors.push(format!("[relay_device.{}] gpio{} used twice", key, gpio));
                    }
                    ports.push(number);
                }
                None => errors.push(format!("[relay_device.{}] {} is not a pin", key, port)),
            }
        }
        devices.push((key.clone(), ports));
    }

    devices
}

fn validate_covers(config: &toml::Value, devices: &Devices, errors: &mut Vec<String>) -> Vec<String> {
    let mut names = Vec::new();
    let Some(table) = config.get("cover").and_then(|c| c.as_table()) else {
        return names;
    };

    for (name, cover) in table {
        let Some(cover) = cover.as_table() else {
            errors.push(format!("[cover.{}] must be a table", name));
            continue;
        };
        names.push(name.clone());

        if name.len() > 16 {
            errors.push(format!("[cover.{}] name longer than 16 characters", name));
        }

        if let Some(travel) = cover.get("travel_ms").and_then(|t| t.as_integer()) {
            if travel < 0 || travel > MAX_TRAVEL_MS {
                errors.push(format!("[cover.{}] travel_ms must be 0-{}", name, MAX_TRAVEL_MS));
            }
        }

        if let Some(policy) = cover.get("stop_policy") {
            let valid = policy
                .as_str()
                .map(|p| STOP_POLICIES.contains(&p.to_lowercase().replace('-', "_").as_str()))
                .unwrap_or(false);
            if !valid {
                errors.push(format!(
                    "[cover.{}] stop_policy must be one of {}",
                    name,
                    STOP_POLICIES.join(", ")
                ));
            }
        }

        for role in ["open", "close"] {
            let Some(relay) = cover.get(role).and_then(|r| r.as_table()) else {
                errors.push(format!("[cover.{}.{}] is required", name, role));
                continue;
            };
            let device = relay.get("device").and_then(|d| d.as_str());
            let port = relay.get("port").and_then(|p| p.as_integer());
            match (device, port) {
                (Some(device), Some(port)) => match devices.iter().find(|(k, _)| k == device) {
                    Some((_, ports)) if ports.contains(&port) => {}
                    Some(_) => errors.push(format!(
                        "[cover.{}.{}] device '{}' has no port {}",
                        name, role, device, port
                    )),
                    None => errors.push(format!(
                        "[cover.{}.{}] references unknown relay device '{}'",
                        name, role, device
                    )),
                },
                _ => errors.push(format!("[cover.{}.{}] needs device and port", name, role)),
            }
        }
    }

    names
}

fn validate_buttons(
    config: &toml::Value,
    covers: &[String],
    pins: &mut HashSet<i64>,
    errors: &mut Vec<String>,
) {
    let Some(table) = config.get("button").and_then(|b| b.as_table()) else {
        return;
    };

    for (name, button) in table {
        let Some(button) = button.as_table() else {
            errors.push(format!("[button.{}] must be a table", name));
            continue;
        };

        match button.get("pin").and_then(|p| p.as_str()).and_then(gpio_number) {
            Some(gpio) => {
                if !pins.insert(gpio) {
                    errors.push(format!("[button.{}] gpio{} already in use", name, gpio));
                }
            }
            None => errors.push(format!("[button.{}] pin is missing or invalid", name)),
        }

        match button.get("cover").and_then(|c| c.as_str()) {
            Some(cover) if covers.iter().any(|c| c == cover) => {}
            Some(cover) => errors.push(format!(
                "[button.{}] references unknown cover '{}'",
                name, cover
            )),
            None => errors.push(format!("[button.{}] cover is required", name)),
        }

        if let Some(command) = button.get("command") {
            let valid = command
                .as_str()
                .map(|c| COMMANDS.contains(&c.to_lowercase().as_str()))
                .unwrap_or(false);
            if !valid {
                errors.push(format!(
                    "[button.{}] command must be one of {}",
                    name,
                    COMMANDS.join(", ")
                ));
            }
        }
    }
}

/// GPIO number of a pin string like "gpio6" or "^!gpio14"
fn gpio_number(pin: &str) -> Option<i64> {
    let pin = pin.trim_start_matches(['^', '!']);
    let number: i64 = pin.strip_prefix("gpio")?.parse().ok()?;
    (0..=29).contains(&number).then_some(number)
}

fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|l| format!("║  • {:<62} ║", l))
            .collect::<Vec<_>>()
            .join("\n")
    );
}
