//! Error types for the control layer.
//!
//! Actuator failures are resolved where they occur: the caller logs them and
//! records the affected state as undefined. Only bootstrap paths (discovery
//! wait, MQTT setup) surface these errors further.

use std::time::Duration;

use alarm_bridge_core::CommandCode;
use thiserror::Error;

/// A result type using `ControlError`.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Errors that can occur in control operations.
#[derive(Debug, Error)]
pub enum ControlError {
    /// A command was issued before any actuator address was discovered.
    #[error("actuator address is undefined")]
    UndefinedAddress,

    /// The request never produced a response (connect, timeout, protocol).
    #[error("actuator request {command} failed: {message}")]
    Transport {
        /// The command being sent.
        command: CommandCode,
        /// Transport error text.
        message: String,
    },

    /// The actuator answered with something other than `200 OK`.
    #[error("actuator returned status {status} for command {command}")]
    UnexpectedStatus {
        /// The command being sent.
        command: CommandCode,
        /// The HTTP status code received.
        status: u16,
    },

    /// No discovery message arrived before the configured deadline.
    #[error("no actuator address discovered within {0:?}")]
    DiscoveryTimeout(Duration),

    /// A discovery payload could not be used as an address.
    #[error("invalid discovery payload: {0}")]
    InvalidPayload(String),

    /// MQTT client error.
    #[error("mqtt error: {0}")]
    Mqtt(String),
}

impl ControlError {
    /// Returns true for failures of an individual actuator command.
    ///
    /// These always collapse the affected state to undefined and are never
    /// retried.
    #[must_use]
    pub const fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Self::UndefinedAddress | Self::Transport { .. } | Self::UnexpectedStatus { .. }
        )
    }
}

impl From<rumqttc::ClientError> for ControlError {
    fn from(err: rumqttc::ClientError) -> Self {
        Self::Mqtt(err.to_string())
    }
}
