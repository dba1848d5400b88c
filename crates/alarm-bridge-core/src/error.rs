//! Common error types for the alarm bridge.
//!
//! This module provides the parsing error for domain values read from text.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised when converting external text into domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The text does not name a blink mode.
    #[error("unknown blink mode: {0}")]
    UnknownBlinkMode(String),
}
