//! Upstream property-change notifications.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A primitive property value as reported upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A boolean flag.
    Bool(bool),
    /// Any numeric value. Integers are carried as `f64`.
    Number(f64),
    /// Anything else, kept as text.
    Text(String),
}

impl PropertyValue {
    /// The numeric value, if this is a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean value, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// An opaque property-change notification from the upstream event source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyChangeEvent {
    /// Property name, e.g. `guardMode`.
    pub name: String,
    /// New value of the property.
    pub value: PropertyValue,
}

impl PropertyChangeEvent {
    /// Create a new event.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_each_primitive() {
        let event: PropertyChangeEvent =
            serde_json::from_str(r#"{"name":"alarm","value":true}"#).unwrap();
        assert_eq!(event.value, PropertyValue::Bool(true));

        let event: PropertyChangeEvent =
            serde_json::from_str(r#"{"name":"guardMode","value":6}"#).unwrap();
        assert_eq!(event.value.as_number(), Some(6.0));

        let event: PropertyChangeEvent =
            serde_json::from_str(r#"{"name":"label","value":"front door"}"#).unwrap();
        assert_eq!(event.value, PropertyValue::Text("front door".to_string()));
    }

    #[test]
    fn accessors_are_type_strict() {
        assert_eq!(PropertyValue::Bool(true).as_number(), None);
        assert_eq!(PropertyValue::Number(1.0).as_bool(), None);
        assert_eq!(PropertyValue::from("6").as_number(), None);
    }

    #[test]
    fn constructor_converts_values() {
        let event = PropertyChangeEvent::new("alarmArmDelay", 30);
        assert_eq!(event.name, "alarmArmDelay");
        assert_eq!(event.value, PropertyValue::Number(30.0));
    }
}
