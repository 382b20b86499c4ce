//! Host Listener Contract
//!
//! Events reach the host as flat key/value tables, the shape scripting
//! runtimes expect (`event.phase`, `event.isError`, ...). The typed event
//! model lives in `core-runtime`; this module only defines the wire shape
//! the listener sees.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scalar value carried in a [`HostEvent`] field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl EventValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EventValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EventValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for EventValue {
    fn from(value: &str) -> Self {
        EventValue::String(value.to_string())
    }
}

impl From<String> for EventValue {
    fn from(value: String) -> Self {
        EventValue::String(value)
    }
}

impl From<bool> for EventValue {
    fn from(value: bool) -> Self {
        EventValue::Bool(value)
    }
}

/// A named event table delivered to the host listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEvent {
    /// Host event name (e.g. `"adsRequest"`)
    pub name: String,
    /// Event fields
    pub fields: BTreeMap<String, EventValue>,
}

impl HostEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<EventValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<EventValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&EventValue> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }
}

/// Host listener trait
///
/// The callable the host registers through `init`. It is invoked on the
/// host's callback-delivery context, one event at a time.
pub trait HostListener: Send + Sync {
    fn on_event(&self, event: &HostEvent);
}
