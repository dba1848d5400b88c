//! Shared fixtures for handler and router tests.

use std::sync::Arc;

use alarm_bridge_control::testing::RecordingActuatorClient;
use alarm_bridge_control::{
    AddressRegistry, AlarmStateMachine, ControlConfig, Controller, PropertyChangeEvent,
};
use tokio::sync::mpsc;

use crate::config::GatewayConfig;
use crate::state::GatewayState;

/// Gateway state over a recording actuator, plus the receiving end of the
/// event queue.
pub fn test_state() -> (
    GatewayState,
    mpsc::Receiver<PropertyChangeEvent>,
    Arc<RecordingActuatorClient>,
) {
    let actuator = Arc::new(RecordingActuatorClient::new());
    let controller = Arc::new(Controller::new(
        Arc::new(AddressRegistry::new()),
        Arc::clone(&actuator) as _,
        ControlConfig::default(),
    ));
    let alarm = Arc::new(AlarmStateMachine::new(controller));
    let (tx, rx) = mpsc::channel(8);

    (
        GatewayState::new(alarm, tx, GatewayConfig::default()),
        rx,
        actuator,
    )
}
