//! Relay output traits

use crate::config::RelayRef;

/// Errors that can occur resolving a relay reference to an output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResolveError {
    /// No relay device with the referenced key
    UnknownDevice,
    /// The device has no port with the referenced number
    UnknownPort,
    /// The port's pin was never registered with the resolver
    PinUnavailable,
    /// The port was already handed to another cover
    AlreadyClaimed,
}

/// Binary actuator driving a relay coil
///
/// Implementations must make `on()` and `off()` idempotent: repeating the
/// current state has no further effect.
pub trait SwitchedOutput {
    /// Energize the relay
    fn on(&mut self);

    /// De-energize the relay
    fn off(&mut self);

    /// Check if the relay is currently energized
    fn is_on(&self) -> bool;
}

/// Produces outputs from configuration references
///
/// Injected into [`crate::Cover::new`] so covers never reach for a global
/// device registry.
pub trait OutputResolver {
    /// Output type handed to covers
    type Output: SwitchedOutput;

    /// Resolve a relay reference
    fn resolve(&mut self, relay: &RelayRef) -> Result<Self::Output, ResolveError>;
}
