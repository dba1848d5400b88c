//! Upstream event ingestion.

use std::sync::Arc;

use alarm_bridge_control::PropertyChangeEvent;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::{ApiError, Result};
use crate::state::GatewayState;

/// Queue a property-change event for the alarm state machine.
///
/// Events are applied in arrival order by the event pump. The response is
/// sent once the event is queued, before its effects run.
///
/// # Example
///
/// ```text
/// POST /v1/events
/// { "name": "alarmArmDelay", "value": 30 }
///
/// Response: 202 Accepted
/// ```
pub async fn submit_event(
    State(state): State<Arc<GatewayState>>,
    Json(event): Json<PropertyChangeEvent>,
) -> Result<StatusCode> {
    if event.name.trim().is_empty() {
        return Err(ApiError::BadRequest("event name is empty".to_string()));
    }

    tracing::debug!(name = %event.name, value = %event.value, "Received upstream event");

    state.events.send(event).await.map_err(|_| {
        tracing::error!("Event pump is not running");
        ApiError::EventPumpUnavailable
    })?;

    Ok(StatusCode::ACCEPTED)
}
