//! Hardware configuration types
//!
//! Pins, relay-providing devices and local push-buttons, plus the
//! [`SystemConfig`] record that ties them to the configured covers.

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::{CoverConfig, MAX_LABEL_LEN};
use crate::state::SymbolicCommand;

/// Maximum covers per config
pub const MAX_COVERS: usize = 8;

/// Maximum relay-providing devices per config
pub const MAX_RELAY_DEVICES: usize = 4;

/// Maximum ports per relay device
pub const MAX_PORTS: usize = 16;

/// Maximum local buttons per config
pub const MAX_BUTTONS: usize = 8;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: false,
        }
    }
}

/// One relay port on a relay device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PortConfig {
    /// Port number as referenced by [`super::RelayRef::port_number`]
    pub number: u8,
    /// Pin driving the relay coil
    pub pin: PinConfig,
}

/// A relay-providing device (the controller itself or an expansion board)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RelayDeviceConfig {
    /// Device key (e.g. "processor")
    pub key: String<MAX_LABEL_LEN>,
    /// Ports exposed by this device
    pub ports: Vec<PortConfig, MAX_PORTS>,
}

impl RelayDeviceConfig {
    /// Find a port by number
    pub fn find_port(&self, number: u8) -> Option<&PortConfig> {
        self.ports.iter().find(|p| p.number == number)
    }
}

/// Local push-button bound to a cover command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ButtonConfig {
    /// Button name
    pub name: String<MAX_LABEL_LEN>,
    /// Input pin (inverted means pressed reads low)
    pub pin: PinConfig,
    /// Name of the cover this button commands
    pub cover: String<MAX_LABEL_LEN>,
    /// Command sent on each press
    pub command: SymbolicCommand,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            pin: PinConfig::default(),
            cover: String::new(),
            command: SymbolicCommand::Toggle,
        }
    }
}

/// Complete controller configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SystemConfig {
    /// Configuration version for compatibility checks
    pub version: u8,
    /// Cover configurations
    pub covers: Vec<CoverConfig, MAX_COVERS>,
    /// Relay device configurations
    pub relay_devices: Vec<RelayDeviceConfig, MAX_RELAY_DEVICES>,
    /// Local button configurations
    pub buttons: Vec<ButtonConfig, MAX_BUTTONS>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            version: 1,
            covers: Vec::new(),
            relay_devices: Vec::new(),
            buttons: Vec::new(),
        }
    }
}

impl SystemConfig {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a cover by name
    pub fn find_cover(&self, name: &str) -> Option<&CoverConfig> {
        self.covers.iter().find(|c| c.name.as_str() == name)
    }

    /// Find a relay device by key
    pub fn find_relay_device(&self, key: &str) -> Option<&RelayDeviceConfig> {
        self.relay_devices.iter().find(|d| d.key.as_str() == key)
    }

    /// Index of a cover by name
    pub fn cover_index(&self, name: &str) -> Option<usize> {
        self.covers.iter().position(|c| c.name.as_str() == name)
    }
}
