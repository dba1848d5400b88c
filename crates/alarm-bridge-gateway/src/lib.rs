//! HTTP surface and process bootstrap for the alarm bridge.
//!
//! This crate provides:
//!
//! - Configuration loading from the environment
//! - A self-refreshing status page and a JSON status snapshot
//! - An ingestion endpoint for upstream property-change events
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use alarm_bridge_control::{AlarmStateMachine, ControlConfig, Controller};
//! use alarm_bridge_gateway::{create_router, GatewayConfig, GatewayState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let controller = Arc::new(Controller::with_http(ControlConfig::default()));
//! let alarm = Arc::new(AlarmStateMachine::new(controller));
//! let (events, _rx) = tokio::sync::mpsc::channel(64);
//!
//! let state = GatewayState::new(alarm, events, GatewayConfig::default());
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::{BridgeConfig, ConfigError, GatewayConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::GatewayState;
