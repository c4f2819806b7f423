//! Symbolic commands

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Intent-level movement command
///
/// `Toggle` is resolved against the current estimate; it is never a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SymbolicCommand {
    Open,
    Close,
    Stop,
    Toggle,
}

impl SymbolicCommand {
    /// Parse a command name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        [
            SymbolicCommand::Open,
            SymbolicCommand::Close,
            SymbolicCommand::Stop,
            SymbolicCommand::Toggle,
        ]
        .into_iter()
        .find(|cmd| cmd.as_str().eq_ignore_ascii_case(name))
    }

    /// Config file spelling
    pub const fn as_str(&self) -> &'static str {
        match self {
            SymbolicCommand::Open => "open",
            SymbolicCommand::Close => "close",
            SymbolicCommand::Stop => "stop",
            SymbolicCommand::Toggle => "toggle",
        }
    }
}
