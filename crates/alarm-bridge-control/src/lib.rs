//! Stateful control logic for the alarm bridge.
//!
//! This crate discovers the actuator, drives its indicator LED, and turns
//! upstream alarm events into relay and indicator-bar commands.
//!
//! # Architecture
//!
//! ```text
//!   MQTT <deployment>/ipaddress            upstream property events
//!              │                                      │
//!              ▼                                      ▼
//!   ┌────────────────────┐               ┌────────────────────────┐
//!   │ DiscoveryListener  │               │   AlarmStateMachine    │
//!   └─────────┬──────────┘               └───────────┬────────────┘
//!             ▼                                      ▼
//!   ┌────────────────────┐     ┌───────────────────────────────────┐
//!   │  AddressRegistry   │◄────│            Controller              │
//!   └─────────┬──────────┘     │  relay / bar state, BlinkScheduler │
//!             │                └─────────────────┬─────────────────┘
//!             │   address per call               ▼
//!             └──────────────────────►  ActuatorClient (HTTP GET)
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use alarm_bridge_control::{AlarmStateMachine, ControlConfig, Controller, DiscoveryListener};
//! use alarm_bridge_core::PropertyChangeEvent;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let controller = Arc::new(Controller::with_http(ControlConfig::default()));
//!
//! // Feed discovery payloads from any pub/sub transport.
//! let (tx, rx) = tokio::sync::mpsc::channel(16);
//! let _listener = DiscoveryListener::new(Arc::clone(controller.registry())).spawn(rx);
//! tx.send(b"192.168.1.40".to_vec()).await?;
//!
//! controller.init().await?;
//!
//! let alarm = AlarmStateMachine::new(Arc::clone(&controller));
//! alarm.handle_event(&PropertyChangeEvent::new("guardMode", 6)).await;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod actuator;
pub mod alarm;
pub mod blink;
pub mod controller;
pub mod discovery;
pub mod error;
pub mod mqtt;
pub mod registry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use actuator::{ActuatorClient, HttpActuatorClient};
pub use alarm::{classify, spawn_event_pump, AlarmStateMachine, AlarmTransition};
pub use blink::BlinkScheduler;
pub use controller::Controller;
pub use discovery::DiscoveryListener;
pub use error::{ControlError, Result};
pub use mqtt::{MqttLink, MqttSettings, MqttTopics};
pub use registry::AddressRegistry;
pub use types::{ControlConfig, ControllerSnapshot};

// Re-export commonly used types from dependencies for convenience
pub use alarm_bridge_core::{
    ActuatorAddress, AlarmStatus, BarColor, BlinkMode, CommandCode, LedOutputState,
    PropertyChangeEvent, PropertyValue, RelayState,
};
