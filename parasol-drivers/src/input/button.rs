//! Debounced push-button
//!
//! Counter-based debounce sampled at a fixed period. A press is reported
//! once, on the sample where the pin has read active for the full debounce
//! window. The button must read idle for the same window before another
//! press can register.

use parasol_hal::InputPin;

/// Default debounce window in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u32 = 50;

/// Debounced push-button on a GPIO input
pub struct DebouncedButton<P> {
    pin: P,
    /// If true, pressed = pin LOW
    inverted: bool,
    debounce_ms: u32,
    /// Time the raw reading has disagreed with the debounced state
    counter_ms: u32,
    pressed: bool,
}

impl<P: InputPin> DebouncedButton<P> {
    /// Create a new button
    ///
    /// # Arguments
    /// - `pin`: The GPIO input
    /// - `inverted`: If true, the button is pressed when the pin reads LOW
    pub fn new(pin: P, inverted: bool) -> Self {
        Self {
            pin,
            inverted,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            counter_ms: 0,
            pressed: false,
        }
    }

    /// Set the debounce window
    pub fn with_debounce_ms(mut self, debounce_ms: u32) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Debounced state
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Raw reading, with inversion applied
    pub fn is_active(&self) -> bool {
        self.pin.is_high() != self.inverted
    }

    /// Sample the pin after `delta_ms` has elapsed
    ///
    /// Returns true exactly once per press, on the press edge.
    pub fn update(&mut self, delta_ms: u32) -> bool {
        if self.is_active() == self.pressed {
            self.counter_ms = 0;
            return false;
        }

        self.counter_ms = self.counter_ms.saturating_add(delta_ms);
        if self.counter_ms < self.debounce_ms {
            return false;
        }

        self.counter_ms = 0;
        self.pressed = !self.pressed;
        if self.pressed {
            log_press();
        }
        self.pressed
    }
}

#[cfg(feature = "defmt")]
fn log_press() {
    defmt::debug!("Button press");
}

#[cfg(not(feature = "defmt"))]
fn log_press() {}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;

    struct MockInput<'a> {
        high: &'a Cell<bool>,
    }

    impl InputPin for MockInput<'_> {
        fn is_high(&self) -> bool {
            self.high.get()
        }
    }

    #[test]
    fn test_press_after_debounce_window() {
        let level = Cell::new(false);
        let mut button = DebouncedButton::new(MockInput { high: &level }, false);

        assert!(!button.update(20));
        level.set(true);
        assert!(!button.update(20));
        assert!(!button.update(20));
        // 60ms active, past the 50ms window
        assert!(button.update(20));
        assert!(button.is_pressed());

        // Held: no repeat
        assert!(!button.update(20));
        assert!(!button.update(1000));
    }

    #[test]
    fn test_bounce_is_ignored() {
        let level = Cell::new(false);
        let mut button = DebouncedButton::new(MockInput { high: &level }, false);

        for _ in 0..10 {
            level.set(true);
            assert!(!button.update(20));
            level.set(false);
            assert!(!button.update(20));
        }
        assert!(!button.is_pressed());
    }

    #[test]
    fn test_release_before_next_press() {
        let level = Cell::new(true);
        let mut button =
            DebouncedButton::new(MockInput { high: &level }, false).with_debounce_ms(40);

        assert!(!button.update(20));
        assert!(button.update(20));

        level.set(false);
        assert!(!button.update(20));
        assert!(!button.update(20));
        assert!(!button.is_pressed());

        level.set(true);
        assert!(!button.update(20));
        assert!(button.update(20));
    }

    #[test]
    fn test_inverted_button() {
        let level = Cell::new(true);
        let mut button = DebouncedButton::new(MockInput { high: &level }, true);

        // Idle high reads as released
        assert!(!button.is_active());
        assert!(!button.update(100));

        level.set(false);
        assert!(button.is_active());
        assert!(button.update(100));
    }
}
