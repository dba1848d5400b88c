//! State values tracked by the controller.
//!
//! Every enum carries an `Undefined` variant: it is the value recorded when
//! the last command to the actuator failed, or before any command was issued.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Text shown for values that are not known.
const UNDEFINED: &str = "UNDEFINED";

/// The controller's belief about the security system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmStatus {
    /// Not armed. This is the assumed status at startup.
    #[default]
    Disarmed,
    /// Armed, waiting for a trigger.
    Armed,
    /// Armed and tripped.
    Triggered,
    /// Unknown.
    Undefined,
}

impl AlarmStatus {
    /// The upper-case name used on the status page and the status topic.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disarmed => "DISARMED",
            Self::Armed => "ARMED",
            Self::Triggered => "TRIGGERED",
            Self::Undefined => UNDEFINED,
        }
    }
}

impl fmt::Display for AlarmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last commanded relay position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelayState {
    /// Contacts open.
    Open,
    /// Contacts closed.
    Closed,
    /// Unknown, either never commanded or the last command failed.
    #[default]
    Undefined,
}

impl RelayState {
    /// The state a successful relay command leaves behind.
    #[must_use]
    pub const fn commanded(close: bool) -> Self {
        if close {
            Self::Closed
        } else {
            Self::Open
        }
    }
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Undefined => UNDEFINED,
        })
    }
}

/// Last commanded electrical state of the indicator LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedOutputState {
    /// LED driven on.
    True,
    /// LED driven off.
    False,
    /// Unknown.
    #[default]
    Undefined,
}

impl From<bool> for LedOutputState {
    fn from(on: bool) -> Self {
        if on {
            Self::True
        } else {
            Self::False
        }
    }
}

impl fmt::Display for LedOutputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Undefined => UNDEFINED,
        })
    }
}

/// Operating mode of the indicator LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlinkMode {
    /// Steady on.
    AlwaysOn,
    /// Steady off.
    AlwaysOff,
    /// Periodic blink with the short unit delay.
    BlinkingFast,
    /// Periodic blink with the long unit delay.
    BlinkingSlow,
    /// Unknown. Initial value, and the value after an actuator failure.
    #[default]
    Undefined,
}

impl BlinkMode {
    /// The upper-case name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlwaysOn => "ALWAYS_ON",
            Self::AlwaysOff => "ALWAYS_OFF",
            Self::BlinkingFast => "BLINKING_FAST",
            Self::BlinkingSlow => "BLINKING_SLOW",
            Self::Undefined => UNDEFINED,
        }
    }
}

impl fmt::Display for BlinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlinkMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALWAYS_ON" => Ok(Self::AlwaysOn),
            "ALWAYS_OFF" => Ok(Self::AlwaysOff),
            "BLINKING_FAST" => Ok(Self::BlinkingFast),
            "BLINKING_SLOW" => Ok(Self::BlinkingSlow),
            "UNDEFINED" => Ok(Self::Undefined),
            _ => Err(CoreError::UnknownBlinkMode(s.to_string())),
        }
    }
}

/// Last commanded color of the indicator bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarColor {
    /// Alarm triggered.
    Red,
    /// Alarm armed.
    Yellow,
    /// Alarm disarmed.
    Green,
    /// Unknown.
    #[default]
    Undefined,
}

impl fmt::Display for BarColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Red => "RED",
            Self::Yellow => "YELLOW",
            Self::Green => "GREEN",
            Self::Undefined => UNDEFINED,
        })
    }
}

/// Network address of the actuator, as `host` or `host:port`.
///
/// Undefined until the first discovery message arrives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActuatorAddress(Option<String>);

impl ActuatorAddress {
    /// The address before discovery.
    #[must_use]
    pub const fn undefined() -> Self {
        Self(None)
    }

    /// A known address.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(Some(address.into()))
    }

    /// Returns true once an address has been discovered.
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        self.0.is_some()
    }

    /// The address text, if known.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Display for ActuatorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or(UNDEFINED))
    }
}
