//! Actuator command set.
//!
//! Each command maps to a single path segment on the actuator's HTTP
//! endpoint: `http://<address>/<code>`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::BarColor;

/// A single-purpose actuator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandCode {
    /// Close the relay (`C`).
    RelayClose,
    /// Open the relay (`O`).
    RelayOpen,
    /// Switch the indicator LED on (`H`).
    LedOn,
    /// Switch the indicator LED off (`L`).
    LedOff,
    /// Set the indicator bar to red (`LR`).
    BarRed,
    /// Set the indicator bar to yellow (`LY`).
    BarYellow,
    /// Set the indicator bar to green (`LG`).
    BarGreen,
}

impl CommandCode {
    /// All commands, in wire-code table order.
    pub const ALL: [Self; 7] = [
        Self::RelayClose,
        Self::RelayOpen,
        Self::LedOn,
        Self::LedOff,
        Self::BarRed,
        Self::BarYellow,
        Self::BarGreen,
    ];

    /// The path segment sent to the actuator.
    #[must_use]
    pub const fn wire_code(self) -> &'static str {
        match self {
            Self::RelayClose => "C",
            Self::RelayOpen => "O",
            Self::LedOn => "H",
            Self::LedOff => "L",
            Self::BarRed => "LR",
            Self::BarYellow => "LY",
            Self::BarGreen => "LG",
        }
    }

    /// The relay command for the requested contact position.
    #[must_use]
    pub const fn relay(close: bool) -> Self {
        if close {
            Self::RelayClose
        } else {
            Self::RelayOpen
        }
    }

    /// The LED command for the requested output level.
    #[must_use]
    pub const fn led(on: bool) -> Self {
        if on {
            Self::LedOn
        } else {
            Self::LedOff
        }
    }

    /// The bar command for a color, or `None` for [`BarColor::Undefined`].
    #[must_use]
    pub const fn bar(color: BarColor) -> Option<Self> {
        match color {
            BarColor::Red => Some(Self::BarRed),
            BarColor::Yellow => Some(Self::BarYellow),
            BarColor::Green => Some(Self::BarGreen),
            BarColor::Undefined => None,
        }
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_code())
    }
}
