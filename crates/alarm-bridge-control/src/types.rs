//! Configuration and snapshot types for the control layer.

use std::time::Duration;

use alarm_bridge_core::{ActuatorAddress, BarColor, BlinkMode, LedOutputState, RelayState};
use serde::{Deserialize, Serialize};

/// Timing configuration for the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Unit delay of the slow blink, in milliseconds.
    #[serde(default = "ControlConfig::default_slow_blink_ms")]
    pub slow_blink_ms: u64,

    /// Unit delay of the fast blink, in milliseconds.
    #[serde(default = "ControlConfig::default_fast_blink_ms")]
    pub fast_blink_ms: u64,

    /// How often startup checks for a discovered address, in milliseconds.
    #[serde(default = "ControlConfig::default_discovery_poll_ms")]
    pub discovery_poll_ms: u64,

    /// Give up waiting for discovery after this many seconds. `None` waits forever.
    #[serde(default)]
    pub discovery_timeout_secs: Option<u64>,

    /// Per-request timeout for actuator commands, in milliseconds.
    #[serde(default = "ControlConfig::default_actuator_timeout_ms")]
    pub actuator_timeout_ms: u64,

    /// Pause between closing and reopening the relay during the self-test.
    #[serde(default = "ControlConfig::default_relay_test_pause_ms")]
    pub relay_test_pause_ms: u64,
}

impl ControlConfig {
    const fn default_slow_blink_ms() -> u64 {
        1000
    }

    const fn default_fast_blink_ms() -> u64 {
        250
    }

    const fn default_discovery_poll_ms() -> u64 {
        1000
    }

    const fn default_actuator_timeout_ms() -> u64 {
        5000
    }

    const fn default_relay_test_pause_ms() -> u64 {
        1000
    }

    /// Slow blink unit delay as a `Duration`.
    #[must_use]
    pub const fn slow_blink(&self) -> Duration {
        Duration::from_millis(self.slow_blink_ms)
    }

    /// Fast blink unit delay as a `Duration`.
    #[must_use]
    pub const fn fast_blink(&self) -> Duration {
        Duration::from_millis(self.fast_blink_ms)
    }

    /// Discovery poll interval as a `Duration`.
    #[must_use]
    pub const fn discovery_poll(&self) -> Duration {
        Duration::from_millis(self.discovery_poll_ms)
    }

    /// Discovery deadline as a `Duration`, if any.
    #[must_use]
    pub fn discovery_timeout(&self) -> Option<Duration> {
        self.discovery_timeout_secs.map(Duration::from_secs)
    }

    /// Actuator request timeout as a `Duration`.
    #[must_use]
    pub const fn actuator_timeout(&self) -> Duration {
        Duration::from_millis(self.actuator_timeout_ms)
    }

    /// Relay self-test pause as a `Duration`.
    #[must_use]
    pub const fn relay_test_pause(&self) -> Duration {
        Duration::from_millis(self.relay_test_pause_ms)
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            slow_blink_ms: Self::default_slow_blink_ms(),
            fast_blink_ms: Self::default_fast_blink_ms(),
            discovery_poll_ms: Self::default_discovery_poll_ms(),
            discovery_timeout_secs: None,
            actuator_timeout_ms: Self::default_actuator_timeout_ms(),
            relay_test_pause_ms: Self::default_relay_test_pause_ms(),
        }
    }
}

/// Point-in-time view of everything the controller tracks about the actuator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    /// Current actuator address.
    pub address: ActuatorAddress,
    /// Last recorded relay state.
    pub relay: RelayState,
    /// Last recorded LED output.
    pub led: LedOutputState,
    /// Current blink mode.
    pub blink_mode: BlinkMode,
    /// Last recorded bar color.
    pub bar_color: BarColor,
}
