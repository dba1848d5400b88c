//! Actuator discovery.
//!
//! The actuator announces its address on a pub/sub topic. The transport
//! forwards raw payloads into a channel; the listener task decodes them and
//! writes the result into the [`AddressRegistry`]. Reception order defines
//! which value is latest.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{ControlError, Result};
use crate::registry::AddressRegistry;

/// Longest payload accepted as an address (`host:port`).
pub const MAX_ADDRESS_LEN: usize = 255;

/// Decodes discovery payloads into the address registry.
#[derive(Debug, Clone)]
pub struct DiscoveryListener {
    registry: Arc<AddressRegistry>,
}

impl DiscoveryListener {
    /// Create a listener writing into `registry`.
    #[must_use]
    pub fn new(registry: Arc<AddressRegistry>) -> Self {
        Self { registry }
    }

    /// Decode a payload as an address.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidPayload` for oversized, non-UTF-8 or
    /// blank payloads.
    pub fn decode(payload: &[u8]) -> Result<&str> {
        if payload.len() > MAX_ADDRESS_LEN {
            return Err(ControlError::InvalidPayload(format!(
                "{} bytes exceeds limit of {MAX_ADDRESS_LEN}",
                payload.len()
            )));
        }

        let text = std::str::from_utf8(payload)
            .map_err(|e| ControlError::InvalidPayload(format!("not UTF-8: {e}")))?
            .trim();

        if text.is_empty() {
            return Err(ControlError::InvalidPayload("empty address".to_string()));
        }

        Ok(text)
    }

    /// Handle one inbound message.
    ///
    /// Returns true if the registry changed. Unusable payloads are logged and
    /// dropped.
    pub fn handle_payload(&self, payload: &[u8]) -> bool {
        match Self::decode(payload) {
            Ok(address) => self.registry.update(address),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping discovery message");
                false
            }
        }
    }

    /// Drain `messages` until every sender is dropped.
    pub async fn run(self, mut messages: mpsc::Receiver<Vec<u8>>) {
        while let Some(payload) = messages.recv().await {
            self.handle_payload(&payload);
        }
        tracing::warn!("Discovery channel closed; actuator address will no longer update");
    }

    /// Spawn [`run`](Self::run) as a background task.
    #[must_use]
    pub fn spawn(self, messages: mpsc::Receiver<Vec<u8>>) -> JoinHandle<()> {
        tokio::spawn(self.run(messages))
    }
}
