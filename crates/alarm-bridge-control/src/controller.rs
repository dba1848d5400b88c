//! Controller composing the actuator-facing components.
//!
//! The controller owns the address registry and the blink scheduler and is
//! the single source of truth for relay and bar state. Every relay or bar
//! operation performs exactly one actuator call and records the commanded
//! state on success, or `UNDEFINED` on failure. Nothing is retried.

use std::sync::Arc;

use alarm_bridge_core::{ActuatorAddress, BarColor, CommandCode, RelayState};
use parking_lot::RwLock;

use crate::actuator::{ActuatorClient, HttpActuatorClient};
use crate::blink::BlinkScheduler;
use crate::error::Result;
use crate::registry::AddressRegistry;
use crate::types::{ControlConfig, ControllerSnapshot};

/// Owner of actuator state.
pub struct Controller {
    registry: Arc<AddressRegistry>,
    actuator: Arc<dyn ActuatorClient>,
    blink: BlinkScheduler,
    relay: RwLock<RelayState>,
    bar: RwLock<BarColor>,
    config: ControlConfig,
}

impl Controller {
    /// Create a controller around an existing registry and transport.
    #[must_use]
    pub fn new(
        registry: Arc<AddressRegistry>,
        actuator: Arc<dyn ActuatorClient>,
        config: ControlConfig,
    ) -> Self {
        let blink = BlinkScheduler::new(
            Arc::clone(&actuator),
            config.slow_blink(),
            config.fast_blink(),
        );

        Self {
            registry,
            actuator,
            blink,
            relay: RwLock::new(RelayState::Undefined),
            bar: RwLock::new(BarColor::Undefined),
            config,
        }
    }

    /// Create a controller with a fresh registry and the HTTP transport.
    #[must_use]
    pub fn with_http(config: ControlConfig) -> Self {
        let registry = Arc::new(AddressRegistry::new());
        let actuator = Arc::new(HttpActuatorClient::new(
            Arc::clone(&registry),
            config.actuator_timeout(),
        ));
        Self::new(registry, actuator, config)
    }

    /// The address registry fed by discovery.
    #[must_use]
    pub const fn registry(&self) -> &Arc<AddressRegistry> {
        &self.registry
    }

    /// The indicator blink scheduler.
    #[must_use]
    pub const fn blink(&self) -> &BlinkScheduler {
        &self.blink
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Current actuator address.
    #[must_use]
    pub fn address(&self) -> ActuatorAddress {
        self.registry.current()
    }

    /// Last recorded relay state.
    #[must_use]
    pub fn relay_status(&self) -> RelayState {
        *self.relay.read()
    }

    /// Last recorded bar color.
    #[must_use]
    pub fn led_bar_status(&self) -> BarColor {
        *self.bar.read()
    }

    /// Everything tracked about the actuator, read at one point in time.
    #[must_use]
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            address: self.address(),
            relay: self.relay_status(),
            led: self.blink.led_state(),
            blink_mode: self.blink.current_mode(),
            bar_color: self.led_bar_status(),
        }
    }

    /// Close (`true`) or open (`false`) the relay.
    ///
    /// Returns the state recorded afterwards.
    pub async fn close_relay(&self, close: bool) -> RelayState {
        let command = CommandCode::relay(close);
        let state = match self.actuator.send(command).await {
            Ok(()) => RelayState::commanded(close),
            Err(e) => {
                tracing::warn!(error = %e, command = %command, "Relay command failed");
                RelayState::Undefined
            }
        };

        *self.relay.write() = state;
        tracing::debug!(relay = %state, "Relay state recorded");
        state
    }

    /// Set the indicator bar color.
    ///
    /// Returns the color recorded afterwards. Asking for `UNDEFINED` sends
    /// nothing and records `UNDEFINED`.
    pub async fn set_bar_color(&self, color: BarColor) -> BarColor {
        let recorded = match CommandCode::bar(color) {
            Some(command) => match self.actuator.send(command).await {
                Ok(()) => color,
                Err(e) => {
                    tracing::warn!(error = %e, command = %command, "Bar command failed");
                    BarColor::Undefined
                }
            },
            None => {
                tracing::warn!("No bar command for an undefined color");
                BarColor::Undefined
            }
        };

        *self.bar.write() = recorded;
        tracing::debug!(bar = %recorded, "Bar color recorded");
        recorded
    }

    /// Wait for the first discovered address.
    ///
    /// Polls the registry at the configured interval. Without a configured
    /// timeout this waits indefinitely.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::DiscoveryTimeout` if the timeout elapses first.
    pub async fn init(&self) -> Result<ActuatorAddress> {
        tracing::info!("Waiting for actuator address");
        let address = self
            .registry
            .wait_until_defined(self.config.discovery_poll(), self.config.discovery_timeout())
            .await?;
        tracing::info!(address = %address, "Actuator discovered");
        Ok(address)
    }

    /// Close the relay, pause, then open it again.
    pub async fn test_relay(&self) -> RelayState {
        tracing::info!("Testing relay");
        self.close_relay(true).await;
        tokio::time::sleep(self.config.relay_test_pause()).await;
        self.close_relay(false).await
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("registry", &self.registry)
            .field("blink", &self.blink)
            .field("relay", &self.relay_status())
            .field("bar", &self.led_bar_status())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alarm_bridge_core::{BlinkMode, LedOutputState};

    use super::*;
    use crate::testing::RecordingActuatorClient;

    fn controller() -> (Arc<RecordingActuatorClient>, Controller) {
        let actuator = Arc::new(RecordingActuatorClient::new());
        let controller = Controller::new(
            Arc::new(AddressRegistry::new()),
            actuator.clone(),
            ControlConfig::default(),
        );
        (actuator, controller)
    }

    #[tokio::test]
    async fn initial_state_is_undefined() {
        let (_, controller) = controller();
        let snapshot = controller.snapshot();

        assert_eq!(snapshot.address, ActuatorAddress::undefined());
        assert_eq!(snapshot.relay, RelayState::Undefined);
        assert_eq!(snapshot.led, LedOutputState::Undefined);
        assert_eq!(snapshot.blink_mode, BlinkMode::Undefined);
        assert_eq!(snapshot.bar_color, BarColor::Undefined);
    }

    #[tokio::test]
    async fn relay_records_commanded_state() {
        let (actuator, controller) = controller();

        assert_eq!(controller.close_relay(true).await, RelayState::Closed);
        assert_eq!(controller.relay_status(), RelayState::Closed);
        assert_eq!(controller.close_relay(false).await, RelayState::Open);
        assert_eq!(controller.relay_status(), RelayState::Open);

        assert_eq!(
            actuator.commands(),
            vec![CommandCode::RelayClose, CommandCode::RelayOpen]
        );
    }

    #[tokio::test]
    async fn relay_failure_persists_as_undefined() {
        let (actuator, controller) = controller();
        controller.close_relay(false).await;
        actuator.fail_on(CommandCode::RelayClose);

        assert_eq!(controller.close_relay(true).await, RelayState::Undefined);
        assert_eq!(controller.relay_status(), RelayState::Undefined);
        assert_eq!(actuator.count(CommandCode::RelayClose), 1);

        // The next successful command replaces the undefined state.
        actuator.succeed_on(CommandCode::RelayClose);
        assert_eq!(controller.close_relay(true).await, RelayState::Closed);
        assert_eq!(controller.relay_status(), RelayState::Closed);
    }

    #[tokio::test]
    async fn bar_color_records_commanded_color() {
        let (actuator, controller) = controller();

        for color in [BarColor::Yellow, BarColor::Red, BarColor::Green] {
            assert_eq!(controller.set_bar_color(color).await, color);
            assert_eq!(controller.led_bar_status(), color);
        }
        assert_eq!(
            actuator.commands(),
            vec![CommandCode::BarYellow, CommandCode::BarRed, CommandCode::BarGreen]
        );
    }

    #[tokio::test]
    async fn bar_failure_is_undefined() {
        let (actuator, controller) = controller();
        actuator.fail_on(CommandCode::BarRed);

        assert_eq!(controller.set_bar_color(BarColor::Red).await, BarColor::Undefined);
        assert_eq!(controller.led_bar_status(), BarColor::Undefined);
    }

    #[tokio::test]
    async fn undefined_bar_color_sends_nothing() {
        let (actuator, controller) = controller();
        controller.set_bar_color(BarColor::Green).await;

        assert_eq!(controller.set_bar_color(BarColor::Undefined).await, BarColor::Undefined);
        assert_eq!(actuator.commands(), vec![CommandCode::BarGreen]);
    }

    #[tokio::test(start_paused = true)]
    async fn relay_self_test_closes_then_opens() {
        let (actuator, controller) = controller();

        assert_eq!(controller.test_relay().await, RelayState::Open);

        let calls = actuator.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].command, CommandCode::RelayClose);
        assert_eq!(calls[1].command, CommandCode::RelayOpen);
        assert_eq!(calls[1].at - calls[0].at, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn init_waits_for_discovery() {
        let (_, controller) = controller();
        let registry = Arc::clone(controller.registry());

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            registry.update("192.168.1.40");
        });

        let address = controller.init().await.unwrap();
        assert_eq!(address.as_str(), Some("192.168.1.40"));
        assert_eq!(controller.address(), address);
    }
}
