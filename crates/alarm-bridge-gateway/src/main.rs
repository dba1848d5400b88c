//! Alarm bridge - MQTT discovery, actuator control and status surface
//!
//! This is the main entry point for the bridge service. Startup order:
//!
//! 1. Connect to the broker and listen for the actuator address.
//! 2. Start the alarm event pump and the HTTP surface.
//! 3. Wait for the first address, optionally cycle the relay, then start
//!    the indicator in its initial mode.
//!
//! Configuration is read from the environment; see `BridgeConfig`.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alarm_bridge_control::{
    spawn_event_pump, AlarmStateMachine, Controller, DiscoveryListener, MqttLink,
};
use alarm_bridge_gateway::{create_router, BridgeConfig, GatewayState};

/// Capacity of the discovery payload queue.
const DISCOVERY_QUEUE: usize = 16;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,alarm_bridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting alarm bridge");

    let config = BridgeConfig::from_env()?;
    let topics = config.topics();

    tracing::info!(
        listen_addr = %config.gateway.listen_addr,
        mqtt_host = %config.mqtt.host,
        mqtt_port = config.mqtt.port,
        discovery_topic = %topics.discovery,
        status_topic = %topics.status,
        "Bridge configuration loaded"
    );

    let controller = Arc::new(Controller::with_http(config.control.clone()));

    // Discovery: broker -> listener -> registry
    let (discovery_tx, discovery_rx) = mpsc::channel(DISCOVERY_QUEUE);
    let _discovery = DiscoveryListener::new(Arc::clone(controller.registry())).spawn(discovery_rx);
    let (mqtt, _mqtt_loop) = MqttLink::start(&config.mqtt, topics, discovery_tx);

    // Alarm: events -> state machine -> actuator, status -> broker
    let alarm = Arc::new(AlarmStateMachine::new(Arc::clone(&controller)));
    let _publisher = mqtt.spawn_status_publisher(alarm.subscribe());
    let (events_tx, events_rx) = mpsc::channel(config.event_queue_capacity);
    let _pump = spawn_event_pump(Arc::clone(&alarm), events_rx);

    // HTTP surface comes up before discovery completes
    let state = GatewayState::new(Arc::clone(&alarm), events_tx, config.gateway.clone());
    let app = create_router(state);

    tracing::info!(listen_addr = %config.gateway.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.gateway.listen_addr).await?;
    let server = tokio::spawn(async move { axum::serve(listener, app).await });

    controller.init().await?;

    if config.relay_self_test {
        let relay = controller.test_relay().await;
        tracing::info!(relay = %relay, "Relay self-test finished");
    }

    controller.blink().set_mode(config.initial_blink_mode).await;
    tracing::info!(mode = %config.initial_blink_mode, "Alarm bridge ready");

    server.await??;

    Ok(())
}
