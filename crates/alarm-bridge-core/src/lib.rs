//! Core domain types for the alarm bridge.
//!
//! This crate provides the value types shared by the control logic and the
//! gateway:
//!
//! - **State enums**: alarm status, relay, LED output, blink mode, bar color
//! - **Commands**: the actuator command set and its wire codes
//! - **Events**: upstream property-change notifications
//!
//! # Example
//!
//! ```
//! use alarm_bridge_core::{BarColor, CommandCode, PropertyChangeEvent, PropertyValue};
//!
//! assert_eq!(CommandCode::RelayClose.wire_code(), "C");
//! assert_eq!(CommandCode::bar(BarColor::Green), Some(CommandCode::BarGreen));
//!
//! let event = PropertyChangeEvent::new("guardMode", PropertyValue::Number(6.0));
//! assert_eq!(event.value.as_number(), Some(6.0));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod command;
pub mod error;
pub mod event;
pub mod state;

pub use command::CommandCode;
pub use error::{CoreError, Result};
pub use event::{PropertyChangeEvent, PropertyValue};
pub use state::{ActuatorAddress, AlarmStatus, BarColor, BlinkMode, LedOutputState, RelayState};
