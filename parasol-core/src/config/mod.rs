//! Configuration types
//!
//! Board-agnostic configuration structures and the parser that builds them
//! from the controller's TOML file.

pub mod hardware;
pub mod parse;
pub mod types;

pub use hardware::*;
pub use parse::{parse_config, ParseError};
pub use types::*;
