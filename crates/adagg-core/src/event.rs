//! Impression Event Data Structure
//!
//! This module defines the normalized `Event` - one ad impression after
//! validation - and the `Dimension` type used for its text fields.
//!
//! ## What is an Event?
//! An event is a single recorded ad display, uploaded as one JSON line:
//!
//! ```text
//! {"impression_id":"i-1","datetime":"2024-05-01T10:00:00Z","campaign_id":"c1",
//!  "client_price_amount":2.5,"duration":10,"device_type":"mobile","quartile":"25"}
//! ```
//!
//! ## Missing Values
//! After normalization no field is ever absent:
//! - Text fields are a [`Dimension`]: either a non-empty value or undefined
//! - Numeric fields are finite `f64` values, defaulting to `0.0`
//!
//! Undefined is a tagged `None` internally. The literal sentinel string
//! `"undefined"` only appears when an event or a summary is serialized, so
//! aggregation code never compares against a magic string.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Literal written in place of a missing text value.
pub const UNDEFINED: &str = "undefined";

/// A text field that is either present (non-empty) or undefined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dimension(Option<String>);

impl Dimension {
    /// The undefined dimension.
    pub const fn undefined() -> Self {
        Dimension(None)
    }

    /// Build from raw text. Empty strings and the sentinel itself are undefined.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() || value == UNDEFINED {
            Dimension(None)
        } else {
            Dimension(Some(value))
        }
    }

    pub fn is_defined(&self) -> bool {
        self.0.is_some()
    }

    pub fn as_option(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// The value as it appears in serialized output.
    pub fn as_str(&self) -> &str {
        self.0.as_deref().unwrap_or(UNDEFINED)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Dimension {
    fn from(value: &str) -> Self {
        Dimension::new(value)
    }
}

impl Serialize for Dimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.map(Dimension::new).unwrap_or_default())
    }
}

/// A single normalized ad impression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub impression_id: Dimension,

    /// Serialized under the input field name `datetime`.
    #[serde(rename = "datetime")]
    pub event_datetime: Dimension,

    pub campaign_id: Dimension,

    pub device_type: Dimension,

    pub quartile: Dimension,

    pub client_price_amount: f64,

    pub duration: f64,
}

impl Event {
    /// Render the event as one input-compatible JSON line.
    pub fn to_json_line(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for Event {
    fn default() -> Self {
        Self {
            impression_id: Dimension::undefined(),
            event_datetime: Dimension::undefined(),
            campaign_id: Dimension::undefined(),
            device_type: Dimension::undefined(),
            quartile: Dimension::undefined(),
            client_price_amount: 0.0,
            duration: 0.0,
        }
    }
}
