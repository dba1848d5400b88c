//! Bridge configuration.
//!
//! Configuration is read from environment variables. Everything except
//! `DEPLOYMENT_ID` has a default.
//!
//! | Variable | Default |
//! |---|---|
//! | `LISTEN_ADDR` | `0.0.0.0:8080` |
//! | `DEPLOYMENT_ID` | required |
//! | `MQTT_HOST` | `broker.emqx.io` |
//! | `MQTT_PORT` | `1883` |
//! | `MQTT_CLIENT_ID` | `alarm-bridge` |
//! | `ACTUATOR_TIMEOUT_MS` | `5000` |
//! | `DISCOVERY_POLL_MS` | `1000` |
//! | `DISCOVERY_TIMEOUT_SECS` | unset (wait forever) |
//! | `RELAY_SELF_TEST` | `true` |
//! | `INITIAL_BLINK_MODE` | `BLINKING_SLOW` |

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use alarm_bridge_control::{ControlConfig, MqttSettings, MqttTopics};
use alarm_bridge_core::BlinkMode;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// The variable name.
        key: &'static str,
        /// The raw value.
        value: String,
        /// Parser error text.
        reason: String,
    },
}

/// Configuration for the HTTP surface.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:8080").
    #[serde(default = "GatewayConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Maximum request body size in bytes.
    #[serde(default = "GatewayConfig::default_max_body")]
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    #[serde(default = "GatewayConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Status page refresh interval in seconds.
    #[serde(default = "GatewayConfig::default_refresh")]
    pub status_refresh_seconds: u32,
}

impl GatewayConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:8080".to_string()
    }

    const fn default_max_body() -> usize {
        16 * 1024
    }

    const fn default_request_timeout() -> u64 {
        10
    }

    const fn default_refresh() -> u32 {
        5
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            max_body_bytes: Self::default_max_body(),
            request_timeout_seconds: Self::default_request_timeout(),
            status_refresh_seconds: Self::default_refresh(),
        }
    }
}

/// Complete configuration of one bridge process.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Identifier scoping the MQTT topics to this deployment.
    pub deployment_id: String,

    /// HTTP surface settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Broker connection settings.
    #[serde(default)]
    pub mqtt: MqttSettings,

    /// Controller timing.
    #[serde(default)]
    pub control: ControlConfig,

    /// Cycle the relay once at startup.
    #[serde(default = "BridgeConfig::default_relay_self_test")]
    pub relay_self_test: bool,

    /// Indicator mode applied once the actuator is discovered.
    #[serde(default = "BridgeConfig::default_initial_blink_mode")]
    pub initial_blink_mode: BlinkMode,

    /// Capacity of the upstream event queue.
    #[serde(default = "BridgeConfig::default_event_queue")]
    pub event_queue_capacity: usize,
}

impl BridgeConfig {
    const fn default_relay_self_test() -> bool {
        true
    }

    const fn default_initial_blink_mode() -> BlinkMode {
        BlinkMode::BlinkingSlow
    }

    const fn default_event_queue() -> usize {
        64
    }

    /// Configuration with defaults for everything but the deployment id.
    #[must_use]
    pub fn new(deployment_id: impl Into<String>) -> Self {
        Self {
            deployment_id: deployment_id.into(),
            gateway: GatewayConfig::default(),
            mqtt: MqttSettings::default(),
            control: ControlConfig::default(),
            relay_self_test: Self::default_relay_self_test(),
            initial_blink_mode: Self::default_initial_blink_mode(),
            event_queue_capacity: Self::default_event_queue(),
        }
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `DEPLOYMENT_ID` is missing or a value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps variable names to values.
    ///
    /// # Errors
    ///
    /// Returns an error if `DEPLOYMENT_ID` is missing or a value does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let deployment_id = lookup("DEPLOYMENT_ID")
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::Missing("DEPLOYMENT_ID"))?;

        let mut config = Self::new(deployment_id.trim());

        if let Some(addr) = lookup("LISTEN_ADDR") {
            config.gateway.listen_addr = addr;
        }
        if let Some(host) = lookup("MQTT_HOST") {
            config.mqtt.host = host;
        }
        if let Some(port) = parse(&lookup, "MQTT_PORT")? {
            config.mqtt.port = port;
        }
        if let Some(client_id) = lookup("MQTT_CLIENT_ID") {
            config.mqtt.client_id = client_id;
        }
        if let Some(ms) = parse(&lookup, "ACTUATOR_TIMEOUT_MS")? {
            config.control.actuator_timeout_ms = ms;
        }
        if let Some(ms) = parse(&lookup, "DISCOVERY_POLL_MS")? {
            config.control.discovery_poll_ms = ms;
        }
        if let Some(secs) = parse(&lookup, "DISCOVERY_TIMEOUT_SECS")? {
            config.control.discovery_timeout_secs = Some(secs);
        }
        if let Some(enabled) = parse(&lookup, "RELAY_SELF_TEST")? {
            config.relay_self_test = enabled;
        }
        if let Some(mode) = parse(&lookup, "INITIAL_BLINK_MODE")? {
            config.initial_blink_mode = mode;
        }

        Ok(config)
    }

    /// MQTT topics for this deployment.
    #[must_use]
    pub fn topics(&self) -> MqttTopics {
        MqttTopics::for_deployment(&self.deployment_id)
    }
}

fn parse<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .map(|value| {
            value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}
