//! Local inputs

pub mod button;

pub use button::{DebouncedButton, DEFAULT_DEBOUNCE_MS};
