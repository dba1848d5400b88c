//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use alarm_bridge_control::{AlarmStateMachine, Controller, PropertyChangeEvent};
use tokio::sync::mpsc;

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayState {
    /// The alarm state machine, which also owns the controller.
    pub alarm: Arc<AlarmStateMachine>,
    /// Queue drained by the event pump.
    pub events: mpsc::Sender<PropertyChangeEvent>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl GatewayState {
    /// Create a new gateway state.
    #[must_use]
    pub const fn new(
        alarm: Arc<AlarmStateMachine>,
        events: mpsc::Sender<PropertyChangeEvent>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            alarm,
            events,
            config,
        }
    }

    /// The controller behind the alarm state machine.
    #[must_use]
    pub fn controller(&self) -> &Controller {
        self.alarm.controller()
    }
}
