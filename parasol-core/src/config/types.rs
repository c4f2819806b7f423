//! Cover configuration types
//!
//! A [`CoverConfig`] is the finished, validated record a [`crate::Cover`]
//! is built from. Parsed files produce [`CoverSettings`] first, where every
//! timing field is optional; [`CoverSettings::resolve`] applies the
//! defaults and validation rules.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum label length (cover names, device keys)
pub const MAX_LABEL_LEN: usize = 16;

/// Relay pulse width used when none (or zero) is configured
pub const DEFAULT_PULSE_WIDTH_MS: u32 = 500;

/// Position sample interval used when neither the cover nor its open relay
/// configure one
pub const DEFAULT_SAMPLE_INTERVAL_MS: u32 = 100;

/// Full closed-to-open travel time used when none (or zero) is configured
pub const DEFAULT_TRAVEL_MS: u32 = 10_000;

/// Settling delay before position changes after the motor starts moving
pub const DEFAULT_DIRECTION_CHANGE_MS: u32 = 500;

/// Longest supported travel time (one hour)
///
/// Keeps `travel_ms * 100` inside `u32`.
pub const MAX_TRAVEL_MS: u32 = 3_600_000;

/// Rule for which relay(s) to pulse when motion is stopped mid-travel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StopPolicy {
    /// No relay pulse; motion ends because nothing drives it
    Stop,
    /// Pulse the relay opposite the direction being stopped
    OppositeDirection,
    /// Pulse both relays
    #[default]
    OpenAndClose,
}

impl StopPolicy {
    /// Parse a policy name
    ///
    /// Accepts the snake_case config spelling and the PascalCase spelling
    /// used by older controller configs ("OppositeDirection").
    pub fn from_name(name: &str) -> Option<Self> {
        let mut normalized: String<24> = String::new();
        for c in name.trim().chars().filter(|c| *c != '_' && *c != '-') {
            normalized.push(c.to_ascii_lowercase()).ok()?;
        }

        match normalized.as_str() {
            "stop" => Some(StopPolicy::Stop),
            "oppositedirection" => Some(StopPolicy::OppositeDirection),
            "openandclose" => Some(StopPolicy::OpenAndClose),
            _ => None,
        }
    }

    /// Parse a policy name, falling back to [`StopPolicy::OpenAndClose`]
    pub fn from_name_or_default(name: &str) -> Self {
        match Self::from_name(name) {
            Some(policy) => policy,
            None => {
                log_warn!("Unknown stop policy {}, using open_and_close", name);
                StopPolicy::OpenAndClose
            }
        }
    }

    /// Config file spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            StopPolicy::Stop => "stop",
            StopPolicy::OppositeDirection => "opposite_direction",
            StopPolicy::OpenAndClose => "open_and_close",
        }
    }
}

/// Reference to a relay port on a relay-providing device
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RelayRef {
    /// Key of the device that owns the port (e.g. "processor")
    pub device_key: String<MAX_LABEL_LEN>,
    /// Port number on that device
    pub port_number: u8,
    /// Minimum change interval (ms)
    ///
    /// On the open relay this doubles as the sample interval fallback.
    pub min_change: u32,
}

impl RelayRef {
    /// Create a relay reference
    pub fn new(device_key: &str, port_number: u8) -> Result<Self, ConfigError> {
        Ok(Self {
            device_key: String::try_from(device_key).map_err(|_| ConfigError::LabelTooLong)?,
            port_number,
            min_change: 0,
        })
    }

    /// Set the minimum change interval
    pub fn with_min_change(mut self, min_change: u32) -> Self {
        self.min_change = min_change;
        self
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A timing value that must be positive is zero
    ZeroDuration,
    /// Travel time exceeds [`MAX_TRAVEL_MS`]
    TravelTooLong,
    /// One sample interval converts to 0 % of travel, so position would
    /// never change
    SampleTooFine,
    /// Cover has no open relay
    MissingOpenRelay,
    /// Cover has no close relay
    MissingCloseRelay,
    /// Label does not fit in [`MAX_LABEL_LEN`]
    LabelTooLong,
}

/// Finished per-cover configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoverConfig {
    /// Cover name
    pub name: String<MAX_LABEL_LEN>,
    /// Relay pulse width (ms)
    pub pulse_width_ms: u32,
    /// Position sample interval (ms)
    pub sample_interval_ms: u32,
    /// Full closed-to-open travel time (ms)
    pub travel_ms: u32,
    /// Settling delay after a start; doubled on a reversal (ms)
    pub direction_change_ms: u32,
    /// Stop policy
    pub stop_policy: StopPolicy,
    /// Relay that drives the cover open
    pub open: RelayRef,
    /// Relay that drives the cover closed
    pub close: RelayRef,
}

impl CoverConfig {
    /// Create a config with default timing and stop policy
    pub fn new(name: &str, open: RelayRef, close: RelayRef) -> Result<Self, ConfigError> {
        Ok(Self {
            name: String::try_from(name).map_err(|_| ConfigError::LabelTooLong)?,
            pulse_width_ms: DEFAULT_PULSE_WIDTH_MS,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            travel_ms: DEFAULT_TRAVEL_MS,
            direction_change_ms: DEFAULT_DIRECTION_CHANGE_MS,
            stop_policy: StopPolicy::default(),
            open,
            close,
        })
    }

    /// Set the stop policy
    pub fn with_stop_policy(mut self, stop_policy: StopPolicy) -> Self {
        self.stop_policy = stop_policy;
        self
    }

    /// Set the travel time
    pub fn with_travel_ms(mut self, travel_ms: u32) -> Self {
        self.travel_ms = travel_ms;
        self
    }

    /// Set the sample interval
    pub fn with_sample_interval_ms(mut self, sample_interval_ms: u32) -> Self {
        self.sample_interval_ms = sample_interval_ms;
        self
    }

    /// Set the pulse width
    pub fn with_pulse_width_ms(mut self, pulse_width_ms: u32) -> Self {
        self.pulse_width_ms = pulse_width_ms;
        self
    }

    /// Set the direction change settling delay
    pub fn with_direction_change_ms(mut self, direction_change_ms: u32) -> Self {
        self.direction_change_ms = direction_change_ms;
        self
    }

    /// Percent of travel covered in one sample interval
    ///
    /// Integer truncation is intentional: the estimator moves in whole
    /// percent steps.
    pub fn sample_percent(&self) -> u8 {
        if self.travel_ms == 0 {
            return 0;
        }
        let percent = 100 * self.sample_interval_ms / self.travel_ms;
        percent.min(u8::MAX as u32) as u8
    }

    /// Check the timing values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pulse_width_ms == 0 || self.sample_interval_ms == 0 || self.travel_ms == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.travel_ms > MAX_TRAVEL_MS || self.sample_interval_ms > MAX_TRAVEL_MS {
            return Err(ConfigError::TravelTooLong);
        }
        if self.sample_percent() == 0 {
            return Err(ConfigError::SampleTooFine);
        }
        Ok(())
    }
}

/// Cover settings as read from a config file
///
/// Zero and absent timing values both mean "use the default".
#[derive(Debug, Clone, Default)]
pub struct CoverSettings {
    pub name: String<MAX_LABEL_LEN>,
    pub pulse_width_ms: Option<u32>,
    pub sample_interval_ms: Option<u32>,
    pub travel_ms: Option<u32>,
    pub direction_change_ms: Option<u32>,
    pub stop_policy: Option<StopPolicy>,
    pub open: Option<RelayRef>,
    pub close: Option<RelayRef>,
}

impl CoverSettings {
    /// Create empty settings for a named cover
    pub fn named(name: String<MAX_LABEL_LEN>) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Apply defaults and validate
    pub fn resolve(self) -> Result<CoverConfig, ConfigError> {
        let open = self.open.ok_or(ConfigError::MissingOpenRelay)?;
        let close = self.close.ok_or(ConfigError::MissingCloseRelay)?;

        let sample_fallback = if open.min_change > 0 {
            open.min_change
        } else {
            DEFAULT_SAMPLE_INTERVAL_MS
        };

        let config = CoverConfig {
            name: self.name,
            pulse_width_ms: non_zero_or(self.pulse_width_ms, DEFAULT_PULSE_WIDTH_MS),
            sample_interval_ms: non_zero_or(self.sample_interval_ms, sample_fallback),
            travel_ms: non_zero_or(self.travel_ms, DEFAULT_TRAVEL_MS),
            direction_change_ms: self
                .direction_change_ms
                .unwrap_or(DEFAULT_DIRECTION_CHANGE_MS),
            stop_policy: self.stop_policy.unwrap_or_default(),
            open,
            close,
        };

        config.validate()?;
        Ok(config)
    }
}

fn non_zero_or(value: Option<u32>, default: u32) -> u32 {
    match value {
        Some(v) if v > 0 => v,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relays() -> (RelayRef, RelayRef) {
        (
            RelayRef::new("processor", 1).unwrap(),
            RelayRef::new("processor", 2).unwrap(),
        )
    }

    #[test]
    fn test_stop_policy_names() {
        assert_eq!(StopPolicy::from_name("stop"), Some(StopPolicy::Stop));
        assert_eq!(
            StopPolicy::from_name("opposite_direction"),
            Some(StopPolicy::OppositeDirection)
        );
        assert_eq!(
            StopPolicy::from_name("OpenAndClose"),
            Some(StopPolicy::OpenAndClose)
        );
        assert_eq!(StopPolicy::from_name("brake"), None);
    }

    #[test]
    fn test_unknown_stop_policy_falls_back() {
        assert_eq!(
            StopPolicy::from_name_or_default("dedicated_relay"),
            StopPolicy::OpenAndClose
        );
    }

    #[test]
    fn test_defaults_applied_for_zero_and_absent() {
        let (open, close) = relays();
        let settings = CoverSettings {
            pulse_width_ms: Some(0),
            travel_ms: None,
            open: Some(open),
            close: Some(close),
            ..CoverSettings::named(String::try_from("screen").unwrap())
        };

        let config = settings.resolve().unwrap();
        assert_eq!(config.pulse_width_ms, DEFAULT_PULSE_WIDTH_MS);
        assert_eq!(config.sample_interval_ms, DEFAULT_SAMPLE_INTERVAL_MS);
        assert_eq!(config.travel_ms, DEFAULT_TRAVEL_MS);
        assert_eq!(config.direction_change_ms, DEFAULT_DIRECTION_CHANGE_MS);
        assert_eq!(config.stop_policy, StopPolicy::OpenAndClose);
    }

    #[test]
    fn test_sample_interval_falls_back_to_open_min_change() {
        let (open, close) = relays();
        let settings = CoverSettings {
            open: Some(open.with_min_change(250)),
            close: Some(close),
            ..Default::default()
        };

        let config = settings.resolve().unwrap();
        assert_eq!(config.sample_interval_ms, 250);
        assert_eq!(config.sample_percent(), 2);
    }

    #[test]
    fn test_missing_relays_rejected() {
        let (open, _) = relays();
        let settings = CoverSettings {
            open: Some(open),
            ..Default::default()
        };
        assert_eq!(settings.resolve(), Err(ConfigError::MissingCloseRelay));

        assert_eq!(
            CoverSettings::default().resolve(),
            Err(ConfigError::MissingOpenRelay)
        );
    }

    #[test]
    fn test_sample_too_fine_rejected() {
        let (open, close) = relays();
        // 100 * 100 / 20000 == 0
        let config = CoverConfig::new("slow", open, close)
            .unwrap()
            .with_travel_ms(20_000);
        assert_eq!(config.validate(), Err(ConfigError::SampleTooFine));
    }

    #[test]
    fn test_travel_too_long_rejected() {
        let (open, close) = relays();
        let config = CoverConfig::new("huge", open, close)
            .unwrap()
            .with_travel_ms(MAX_TRAVEL_MS + 1)
            .with_sample_interval_ms(60_000);
        assert_eq!(config.validate(), Err(ConfigError::TravelTooLong));
    }

    #[test]
    fn test_sample_percent_truncates() {
        let (open, close) = relays();
        let config = CoverConfig::new("screen", open, close)
            .unwrap()
            .with_travel_ms(15_000)
            .with_sample_interval_ms(200);
        // 20000 / 15000 == 1 (truncated)
        assert_eq!(config.sample_percent(), 1);
    }
}
