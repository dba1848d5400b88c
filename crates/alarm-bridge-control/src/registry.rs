//! Guarded register holding the actuator's network address.
//!
//! The discovery listener is the only writer. Every actuator command reads
//! the current value at the moment it is sent.

use std::time::Duration;

use alarm_bridge_core::ActuatorAddress;
use parking_lot::RwLock;
use tokio::time::Instant;

use crate::error::{ControlError, Result};

/// Holds the most recently discovered actuator address.
#[derive(Debug, Default)]
pub struct AddressRegistry {
    address: RwLock<ActuatorAddress>,
}

impl AddressRegistry {
    /// Create a registry with an undefined address.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current address.
    #[must_use]
    pub fn current(&self) -> ActuatorAddress {
        self.address.read().clone()
    }

    /// Check whether an address has been discovered yet.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.address.read().is_defined()
    }

    /// Store `address` if it differs from the current one.
    ///
    /// Returns true when the stored value changed. Duplicate deliveries of
    /// the current address are no-ops.
    pub fn update(&self, address: &str) -> bool {
        let mut current = self.address.write();
        if current.as_str() == Some(address) {
            return false;
        }

        tracing::info!(
            address = %address,
            previous = %current,
            "Actuator address updated"
        );
        *current = ActuatorAddress::new(address);
        true
    }

    /// Suspend until an address is known, checking every `poll`.
    ///
    /// With `timeout` set to `None` this waits indefinitely.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::DiscoveryTimeout` if the deadline passes first.
    pub async fn wait_until_defined(
        &self,
        poll: Duration,
        timeout: Option<Duration>,
    ) -> Result<ActuatorAddress> {
        let started = Instant::now();

        loop {
            let address = self.current();
            if address.is_defined() {
                return Ok(address);
            }

            if let Some(limit) = timeout {
                if started.elapsed() >= limit {
                    return Err(ControlError::DiscoveryTimeout(limit));
                }
            }

            tracing::debug!("Waiting for actuator address");
            tokio::time::sleep(poll).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn starts_undefined() {
        let registry = AddressRegistry::new();
        assert!(!registry.is_defined());
        assert_eq!(registry.current(), ActuatorAddress::undefined());
    }

    #[test]
    fn keeps_latest_delivered_value() {
        let registry = AddressRegistry::new();

        for address in ["10.0.0.5", "10.0.0.6", "10.0.0.5:8080", "10.0.0.7"] {
            registry.update(address);
            assert_eq!(registry.current().as_str(), Some(address));
        }
    }

    #[test]
    fn duplicate_update_is_noop() {
        let registry = AddressRegistry::new();

        assert!(registry.update("10.0.0.5"));
        assert!(!registry.update("10.0.0.5"));
        assert!(registry.update("10.0.0.6"));
        assert_eq!(registry.current().as_str(), Some("10.0.0.6"));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_returns_once_address_arrives() {
        let registry = Arc::new(AddressRegistry::new());

        let writer = Arc::clone(&registry);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(3500)).await;
            writer.update("192.168.1.40");
        });

        let started = Instant::now();
        let address = registry
            .wait_until_defined(Duration::from_secs(1), None)
            .await
            .unwrap();

        assert_eq!(address.as_str(), Some("192.168.1.40"));
        // Seen on the first poll after the update.
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_times_out() {
        let registry = AddressRegistry::new();

        let result = registry
            .wait_until_defined(Duration::from_secs(1), Some(Duration::from_secs(3)))
            .await;

        assert!(matches!(result, Err(ControlError::DiscoveryTimeout(d)) if d == Duration::from_secs(3)));
    }
}
