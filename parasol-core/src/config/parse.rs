//! Simple TOML parser for controller configuration
//!
//! Line-oriented and allocation-free. It handles only the subset of TOML
//! the cover configuration uses.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section.name] and [section.name.subsection] headers
//! - Comments (# ...)
//!
//! Sections:
//! - `[cover.NAME]`: timing and stop policy
//! - `[cover.NAME.open]`, `[cover.NAME.close]`: relay references
//! - `[relay_device.KEY]`: `portN = "gpioX"` entries
//! - `[button.NAME]`: local push-button bound to a cover
//!
//! NOT supported:
//! - Arrays and inline tables
//! - Multi-line strings
//! - Dotted keys outside section headers

use heapless::String as HString;

use super::hardware::{ButtonConfig, PinConfig, PortConfig, RelayDeviceConfig, SystemConfig};
use super::types::{ConfigError, CoverSettings, RelayRef, StopPolicy, MAX_LABEL_LEN};
use crate::state::SymbolicCommand;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
    /// Invalid pin string
    InvalidPin,
    /// A relay section is missing its device or port
    MissingField,
    /// Two sections of the same kind share a name
    DuplicateName,
    /// A button refers to a cover that is not configured
    UnknownCover,
    /// A cover failed validation
    Cover(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(err: ConfigError) -> Self {
        ParseError::Cover(err)
    }
}

/// Which relay of a cover a subsection configures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelayRole {
    Open,
    Close,
}

/// Current parsing context
#[derive(Debug, Clone)]
enum Section {
    Root,
    Cover(HString<MAX_LABEL_LEN>),
    CoverRelay(HString<MAX_LABEL_LEN>, RelayRole),
    RelayDevice(HString<MAX_LABEL_LEN>),
    Button(HString<MAX_LABEL_LEN>),
}

/// Sections being built
#[derive(Default)]
struct Pending {
    cover: Option<CoverSettings>,
    relay_device: Option<RelayDeviceConfig>,
    button: Option<ButtonConfig>,
}

/// Parse TOML configuration into SystemConfig
pub fn parse_config(input: &str) -> Result<SystemConfig, ParseError> {
    let mut config = SystemConfig::new();
    let mut section = Section::Root;
    let mut pending = Pending::default();

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            let next = parse_section_header(&line[1..line.len() - 1])?;
            open_section(&next, &mut config, &mut pending)?;
            section = next;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(&section, key, value, &mut pending)?;
        }
    }

    flush_cover(&mut config, &mut pending)?;
    flush_other(&mut config, &mut pending)?;

    for button in config.buttons.iter() {
        if config.find_cover(button.cover.as_str()).is_none() {
            log_error!(
                "Button {} refers to unknown cover {}",
                button.name.as_str(),
                button.cover.as_str()
            );
            return Err(ParseError::UnknownCover);
        }
    }

    log_info!(
        "Parsed {} covers, {} relay devices",
        config.covers.len(),
        config.relay_devices.len()
    );
    Ok(config)
}

/// Parse section header like "cover.patio", "cover.patio.open" or "relay_device.processor"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let mut parts = header.trim().split('.').map(str::trim);
    let kind = parts.next().ok_or(ParseError::InvalidSection)?;
    let name = parts.next().ok_or(ParseError::InvalidSection)?;
    let sub = parts.next();
    if parts.next().is_some() || name.is_empty() {
        return Err(ParseError::InvalidSection);
    }

    let name = HString::try_from(name).map_err(|_| ParseError::InvalidSection)?;

    match (kind, sub) {
        ("cover", None) => Ok(Section::Cover(name)),
        ("cover", Some("open")) => Ok(Section::CoverRelay(name, RelayRole::Open)),
        ("cover", Some("close")) => Ok(Section::CoverRelay(name, RelayRole::Close)),
        ("relay_device", None) => Ok(Section::RelayDevice(name)),
        ("button", None) => Ok(Section::Button(name)),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Save whatever the previous section built and start the next one
fn open_section(
    next: &Section,
    config: &mut SystemConfig,
    pending: &mut Pending,
) -> Result<(), ParseError> {
    flush_other(config, pending)?;

    // Relay subsections extend the cover that precedes them
    let continues_cover = match (next, &pending.cover) {
        (Section::CoverRelay(name, _), Some(cover)) => cover.name == *name,
        _ => false,
    };
    if !continues_cover {
        flush_cover(config, pending)?;
    }

    match next {
        Section::Cover(name) => {
            if config.find_cover(name.as_str()).is_some() {
                return Err(ParseError::DuplicateName);
            }
            pending.cover = Some(CoverSettings::named(name.clone()));
        }
        Section::CoverRelay(name, role) => {
            if pending.cover.is_none() && config.find_cover(name.as_str()).is_some() {
                return Err(ParseError::DuplicateName);
            }
            let cover = pending
                .cover
                .get_or_insert_with(|| CoverSettings::named(name.clone()));
            let relay = Some(RelayRef::default());
            match role {
                RelayRole::Open => cover.open = relay,
                RelayRole::Close => cover.close = relay,
            }
        }
        Section::RelayDevice(key) => {
            if config.find_relay_device(key.as_str()).is_some() {
                return Err(ParseError::DuplicateName);
            }
            pending.relay_device = Some(RelayDeviceConfig {
                key: key.clone(),
                ..Default::default()
            });
        }
        Section::Button(name) => {
            pending.button = Some(ButtonConfig {
                name: name.clone(),
                ..Default::default()
            });
        }
        Section::Root => {}
    }

    Ok(())
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseError> {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        Ok(&value[1..value.len() - 1])
    } else {
        // Allow unquoted strings for simple values
        Ok(value)
    }
}

/// Parse a bounded label
fn parse_label(value: &str) -> Result<HString<MAX_LABEL_LEN>, ParseError> {
    HString::try_from(parse_string(value)?).map_err(|_| ParseError::InvalidValue)
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a pin string like "gpio11", "!gpio12", "^gpio4"
fn parse_pin(value: &str) -> Result<PinConfig, ParseError> {
    let value = parse_string(value)?;
    let mut inverted = false;
    let mut pull_up = false;
    let mut s = value;

    // Check for modifiers
    while !s.is_empty() {
        if let Some(rest) = s.strip_prefix('!') {
            inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    let pin = s
        .strip_prefix("gpio")
        .ok_or(ParseError::InvalidPin)?
        .parse()
        .map_err(|_| ParseError::InvalidPin)?;

    Ok(PinConfig {
        pin,
        inverted,
        pull_up,
    })
}

/// Parse a port key like "port3"
fn parse_port_key(key: &str) -> Option<u8> {
    key.strip_prefix("port")?.parse().ok()
}

/// Apply a parsed value to the appropriate config field
fn apply_value(
    section: &Section,
    key: &str,
    value: &str,
    pending: &mut Pending,
) -> Result<(), ParseError> {
    match section {
        Section::Cover(_) => {
            let c = pending.cover.as_mut().ok_or(ParseError::InvalidSection)?;
            match key {
                "pulse_width_ms" | "pulse_time_ms" => c.pulse_width_ms = Some(parse_int(value)?),
                "sample_interval_ms" => c.sample_interval_ms = Some(parse_int(value)?),
                "travel_ms" => c.travel_ms = Some(parse_int(value)?),
                "direction_change_ms" => c.direction_change_ms = Some(parse_int(value)?),
                "stop_policy" => {
                    c.stop_policy = Some(StopPolicy::from_name_or_default(parse_string(value)?))
                }
                _ => {} // Ignore unknown keys
            }
        }
        Section::CoverRelay(_, role) => {
            let c = pending.cover.as_mut().ok_or(ParseError::InvalidSection)?;
            let relay = match role {
                RelayRole::Open => c.open.as_mut(),
                RelayRole::Close => c.close.as_mut(),
            }
            .ok_or(ParseError::InvalidSection)?;
            match key {
                "device" => relay.device_key = parse_label(value)?,
                "port" => relay.port_number = parse_int(value)?,
                "min_change_ms" => relay.min_change = parse_int(value)?,
                _ => {}
            }
        }
        Section::RelayDevice(_) => {
            let d = pending
                .relay_device
                .as_mut()
                .ok_or(ParseError::InvalidSection)?;
            if let Some(number) = parse_port_key(key) {
                if d.find_port(number).is_some() {
                    return Err(ParseError::DuplicateName);
                }
                d.ports
                    .push(PortConfig {
                        number,
                        pin: parse_pin(value)?,
                    })
                    .map_err(|_| ParseError::TooManyItems)?;
            }
        }
        Section::Button(_) => {
            let b = pending.button.as_mut().ok_or(ParseError::InvalidSection)?;
            match key {
                "pin" => b.pin = parse_pin(value)?,
                "cover" => b.cover = parse_label(value)?,
                "command" => {
                    b.command = SymbolicCommand::from_name(parse_string(value)?)
                        .ok_or(ParseError::InvalidValue)?
                }
                _ => {}
            }
        }
        Section::Root => {
            // Handle root-level keys if any
        }
    }

    Ok(())
}

/// Resolve and store the cover being built, if any
fn flush_cover(config: &mut SystemConfig, pending: &mut Pending) -> Result<(), ParseError> {
    let Some(settings) = pending.cover.take() else {
        return Ok(());
    };

    let incomplete = |relay: &Option<RelayRef>| {
        relay.as_ref().is_some_and(|r| r.device_key.is_empty())
    };
    if incomplete(&settings.open) || incomplete(&settings.close) {
        log_error!("Cover {} has a relay without a device", settings.name.as_str());
        return Err(ParseError::MissingField);
    }

    let cover = settings.resolve()?;
    config
        .covers
        .push(cover)
        .map_err(|_| ParseError::TooManyItems)
}

/// Store the relay device or button being built, if any
fn flush_other(config: &mut SystemConfig, pending: &mut Pending) -> Result<(), ParseError> {
    if let Some(device) = pending.relay_device.take() {
        config
            .relay_devices
            .push(device)
            .map_err(|_| ParseError::TooManyItems)?;
    }
    if let Some(button) = pending.button.take() {
        config
            .buttons
            .push(button)
            .map_err(|_| ParseError::TooManyItems)?;
    }
    Ok(())
}
