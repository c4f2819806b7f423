//! Relay bank
//!
//! Holds the GPIO pins behind every configured relay device and hands each
//! one out at most once, as a [`GpioRelay`], when a cover resolves its
//! relay references.

use heapless::{FnvIndexSet, Vec};
use parasol_core::config::{RelayDeviceConfig, RelayRef};
use parasol_core::traits::{OutputResolver, ResolveError};
use parasol_hal::OutputPin;

use super::gpio::GpioRelay;

/// Maximum number of pins a bank can hold (every RP2040 GPIO)
pub const MAX_BANK_PINS: usize = 30;

/// Port registry for the configured relay devices
pub struct RelayBank<'c, P> {
    devices: &'c [RelayDeviceConfig],
    /// Registered pins not yet handed out, keyed by GPIO number
    pins: Vec<(u8, P), MAX_BANK_PINS>,
    /// GPIO numbers already handed out
    claimed: FnvIndexSet<u8, 32>,
}

impl<'c, P: OutputPin> RelayBank<'c, P> {
    /// Create an empty bank for the given devices
    pub fn new(devices: &'c [RelayDeviceConfig]) -> Self {
        Self {
            devices,
            pins: Vec::new(),
            claimed: FnvIndexSet::new(),
        }
    }

    /// GPIO numbers the configured devices drive
    pub fn required_pins(devices: &[RelayDeviceConfig]) -> impl Iterator<Item = u8> + '_ {
        devices
            .iter()
            .flat_map(|d| d.ports.iter().map(|p| p.pin.pin))
    }

    /// Register the pin behind a GPIO number
    ///
    /// Gives the pin back if the bank is full or the number is taken.
    pub fn add_pin(&mut self, gpio: u8, pin: P) -> Result<(), P> {
        if self.has_pin(gpio) || self.claimed.contains(&gpio) {
            return Err(pin);
        }
        self.pins.push((gpio, pin)).map_err(|(_, pin)| pin)
    }

    /// Whether an unclaimed pin is registered for a GPIO number
    pub fn has_pin(&self, gpio: u8) -> bool {
        self.pins.iter().any(|(n, _)| *n == gpio)
    }

    /// Number of registered pins not yet handed out
    pub fn available(&self) -> usize {
        self.pins.len()
    }
}

impl<'c, P: OutputPin> OutputResolver for RelayBank<'c, P> {
    type Output = GpioRelay<P>;

    fn resolve(&mut self, relay: &RelayRef) -> Result<GpioRelay<P>, ResolveError> {
        let device = self
            .devices
            .iter()
            .find(|d| d.key == relay.device_key)
            .ok_or(ResolveError::UnknownDevice)?;
        let port = device
            .find_port(relay.port_number)
            .ok_or(ResolveError::UnknownPort)?;

        let gpio = port.pin.pin;
        if self.claimed.contains(&gpio) {
            return Err(ResolveError::AlreadyClaimed);
        }
        let index = self
            .pins
            .iter()
            .position(|(n, _)| *n == gpio)
            .ok_or(ResolveError::PinUnavailable)?;

        let (_, pin) = self.pins.swap_remove(index);
        // Capacity matches MAX_BANK_PINS, and every claimed pin left `pins`
        let _ = self.claimed.insert(gpio);
        Ok(GpioRelay::new(pin, port.pin.inverted))
    }
}

#[cfg(test)]
mod tests {
    use heapless::String;
    use parasol_core::config::{PinConfig, PortConfig};
    use parasol_core::traits::SwitchedOutput;

    use super::*;
    use crate::relay::gpio::tests::MockPin;

    fn devices() -> [RelayDeviceConfig; 1] {
        let mut device = RelayDeviceConfig {
            key: String::try_from("processor").unwrap(),
            ..Default::default()
        };
        device
            .ports
            .push(PortConfig {
                number: 1,
                pin: PinConfig::new(6),
            })
            .unwrap();
        device
            .ports
            .push(PortConfig {
                number: 2,
                pin: PinConfig::inverted(7),
            })
            .unwrap();
        [device]
    }

    fn bank(devices: &[RelayDeviceConfig]) -> RelayBank<'_, MockPin> {
        let mut bank = RelayBank::new(devices);
        for gpio in RelayBank::<MockPin>::required_pins(devices) {
            assert!(bank.add_pin(gpio, MockPin::new()).is_ok());
        }
        bank
    }

    #[test]
    fn test_required_pins() {
        let devices = devices();
        let mut pins = RelayBank::<MockPin>::required_pins(&devices);
        assert_eq!(pins.next(), Some(6));
        assert_eq!(pins.next(), Some(7));
        assert_eq!(pins.next(), None);
    }

    #[test]
    fn test_resolve_honours_polarity() {
        let devices = devices();
        let mut bank = bank(&devices);

        let mut open = bank.resolve(&RelayRef::new("processor", 1).unwrap()).unwrap();
        let close = bank.resolve(&RelayRef::new("processor", 2).unwrap()).unwrap();

        open.on();
        assert!(open.pin().is_set_high());
        // Active-low relay idles with the pin high
        assert!(!close.is_on());
        assert!(close.pin().is_set_high());
        assert_eq!(bank.available(), 0);
    }

    #[test]
    fn test_resolve_errors() {
        let devices = devices();
        let mut bank = bank(&devices);

        assert_eq!(
            bank.resolve(&RelayRef::new("expander", 1).unwrap()).err(),
            Some(ResolveError::UnknownDevice)
        );
        assert_eq!(
            bank.resolve(&RelayRef::new("processor", 9).unwrap()).err(),
            Some(ResolveError::UnknownPort)
        );

        let port1 = RelayRef::new("processor", 1).unwrap();
        assert!(bank.resolve(&port1).is_ok());
        assert_eq!(bank.resolve(&port1).err(), Some(ResolveError::AlreadyClaimed));
    }

    #[test]
    fn test_unregistered_pin() {
        let devices = devices();
        let mut bank: RelayBank<'_, MockPin> = RelayBank::new(&devices);
        assert_eq!(
            bank.resolve(&RelayRef::new("processor", 1).unwrap()).err(),
            Some(ResolveError::PinUnavailable)
        );
    }

    #[test]
    fn test_add_pin_rejects_duplicates() {
        let devices = devices();
        let mut bank: RelayBank<'_, MockPin> = RelayBank::new(&devices);
        assert!(bank.add_pin(6, MockPin::new()).is_ok());
        assert!(bank.add_pin(6, MockPin::new()).is_err());
    }
}
