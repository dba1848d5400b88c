//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{events, health, status};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// - `GET /` - Status page (HTML, auto-refreshing)
/// - `GET /health` - Health check
/// - `GET /v1/status` - Status snapshot (JSON)
/// - `POST /v1/events` - Queue an upstream property-change event
pub fn create_router(state: GatewayState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let state = Arc::new(state);

    Router::new()
        .route("/", get(status::status_page))
        .route("/health", get(health::health))
        .route("/v1/status", get(status::get_status))
        .route("/v1/events", post(events::submit_event))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alarm_bridge_control::{AlarmStatus, BarColor, BlinkMode, CommandCode, RelayState};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use super::*;
    use crate::testing::test_state;

    #[tokio::test]
    async fn health_endpoint() {
        let (state, _events, _actuator) = test_state();
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server.get("/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["actuator_discovered"], false);
    }

    #[tokio::test]
    async fn status_page_before_discovery() {
        let (state, _events, _actuator) = test_state();
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server.get("/").await;
        response.assert_status_ok();

        let page = response.text();
        assert!(page.contains("Relay IP Address: UNDEFINED"));
        assert!(page.contains("Alarm: DISARMED"));
    }

    #[tokio::test]
    async fn status_snapshot_reflects_controller() {
        let (state, _events, _actuator) = test_state();
        state.controller().registry().update("10.0.0.7");
        state.controller().close_relay(true).await;
        state.controller().set_bar_color(BarColor::Red).await;
        state.controller().blink().set_mode(BlinkMode::AlwaysOn).await;

        let server = TestServer::new(create_router(state)).unwrap();
        let response = server.get("/v1/status").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["alarm_status"], "DISARMED");
        assert_eq!(body["address"], "10.0.0.7");
        assert_eq!(body["relay"], "CLOSED");
        assert_eq!(body["bar_color"], "RED");
        assert_eq!(body["blink_mode"], "ALWAYS_ON");
        assert_eq!(body["led"], "TRUE");
        assert!(body["alarm_changed_at"].is_string());
    }

    #[tokio::test]
    async fn failed_command_shows_undefined() {
        let (state, _events, actuator) = test_state();
        state.controller().registry().update("10.0.0.7");
        assert_eq!(state.controller().close_relay(true).await, RelayState::Closed);
        actuator.fail_on(CommandCode::RelayOpen);
        assert_eq!(state.controller().close_relay(false).await, RelayState::Undefined);

        let server = TestServer::new(create_router(state)).unwrap();
        let body: Value = server.get("/v1/status").await.json();
        assert_eq!(body["relay"], "UNDEFINED");
    }

    #[tokio::test]
    async fn events_are_queued() {
        let (state, mut events, _actuator) = test_state();
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server
            .post("/v1/events")
            .json(&json!({ "name": "alarmArmDelay", "value": 30 }))
            .await;
        response.assert_status(StatusCode::ACCEPTED);

        let event = events.recv().await.unwrap();
        assert_eq!(event.name, "alarmArmDelay");
        assert_eq!(event.value.as_number(), Some(30.0));
    }

    #[tokio::test]
    async fn empty_event_name_is_rejected() {
        let (state, _events, _actuator) = test_state();
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server
            .post("/v1/events")
            .json(&json!({ "name": " ", "value": true }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn events_without_pump_are_unavailable() {
        let (state, events, _actuator) = test_state();
        drop(events);
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server
            .post("/v1/events")
            .json(&json!({ "name": "guardMode", "value": 6 }))
            .await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn events_drive_the_alarm_through_the_pump() {
        let (state, events, actuator) = test_state();
        state.controller().registry().update("10.0.0.7");
        let alarm = Arc::clone(&state.alarm);
        let mut watcher = alarm.subscribe();
        let _pump = alarm_bridge_control::spawn_event_pump(Arc::clone(&alarm), events);

        let server = TestServer::new(create_router(state)).unwrap();
        server
            .post("/v1/events")
            .json(&json!({ "name": "alarmArmDelay", "value": 30 }))
            .await
            .assert_status(StatusCode::ACCEPTED);

        watcher.changed().await.unwrap();
        assert_eq!(*watcher.borrow(), AlarmStatus::Armed);

        // The status flips before the bar command completes.
        for _ in 0..50 {
            if actuator.count(CommandCode::BarYellow) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(actuator.count(CommandCode::BarYellow), 1);
    }
}
