//! Status page and status snapshot endpoints.

use std::fmt::Write as _;
use std::sync::Arc;

use alarm_bridge_control::{AlarmStatus, ControllerSnapshot};
use axum::extract::State;
use axum::response::Html;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::GatewayState;

/// Full bridge status.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Current alarm status.
    pub alarm_status: AlarmStatus,
    /// When the alarm status last changed.
    pub alarm_changed_at: DateTime<Utc>,
    /// Everything the controller tracks about the actuator.
    #[serde(flatten)]
    pub actuator: ControllerSnapshot,
}

/// Get the bridge status.
///
/// # Example
///
/// ```text
/// GET /v1/status
///
/// Response: 200 OK
/// {
///   "alarm_status": "ARMED",
///   "alarm_changed_at": "2026-03-01T18:22:05.120Z",
///   "address": "192.168.1.40",
///   "relay": "OPEN",
///   "led": "TRUE",
///   "blink_mode": "BLINKING_SLOW",
///   "bar_color": "YELLOW"
/// }
/// ```
pub async fn get_status(State(state): State<Arc<GatewayState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        alarm_status: state.alarm.status(),
        alarm_changed_at: state.alarm.changed_at(),
        actuator: state.controller().snapshot(),
    })
}

/// Human-readable status page.
///
/// The page reloads itself every `status_refresh_seconds`.
pub async fn status_page(State(state): State<Arc<GatewayState>>) -> Html<String> {
    Html(render_page(
        &state.controller().address().to_string(),
        state.alarm.status(),
        state.config.status_refresh_seconds,
    ))
}

fn render_page(address: &str, status: AlarmStatus, refresh_seconds: u32) -> String {
    let mut page = String::with_capacity(256);
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    let _ = writeln!(
        page,
        "<meta http-equiv=\"refresh\" content=\"{refresh_seconds}\">"
    );
    page.push_str("<title>Alarm bridge</title>\n</head>\n<body>\n");
    let _ = writeln!(page, "<h1>Relay IP Address: {}</h1>", escape(address));
    let _ = writeln!(page, "<h1>Alarm: {status}</h1>");
    page.push_str("</body>\n</html>\n");
    page
}

// The address arrives over the broker and is not trusted.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_shows_address_and_status() {
        let page = render_page("192.168.1.40", AlarmStatus::Armed, 5);

        assert!(page.contains("<meta http-equiv=\"refresh\" content=\"5\">"));
        assert!(page.contains("Relay IP Address: 192.168.1.40"));
        assert!(page.contains("Alarm: ARMED"));
    }

    #[test]
    fn page_escapes_address() {
        let page = render_page("<script>x</script>", AlarmStatus::Disarmed, 5);

        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;x&lt;/script&gt;"));
    }

    #[test]
    fn undefined_address_is_rendered() {
        let page = render_page("UNDEFINED", AlarmStatus::Disarmed, 5);
        assert!(page.contains("Relay IP Address: UNDEFINED"));
    }
}
