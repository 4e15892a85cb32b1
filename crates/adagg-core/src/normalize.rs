//! Record validation and normalization.
//!
//! Turns one raw input line into a normalized [`Event`] or a [`Rejection`].
//! Normalization is pure: the same line and config always give the same
//! result, and nothing here performs I/O or logs.
//!
//! ## Lenient mode (default)
//!
//! - Text fields that are absent, null, empty, or `"undefined"` become
//!   undefined. Numbers and booleans keep their JSON text.
//! - Numeric fields accept JSON numbers and numeric strings; anything else
//!   becomes `0.0`.
//!
//! Numbers outside the `f64` range (`1e400`) are valid JSON. They keep the
//! record: as a numeric field they become `0.0`, as a text field they keep
//! their literal text.
//!
//! ## Strict mode
//!
//! The fields needed for aggregation (`campaign_id`, `client_price_amount`,
//! `device_type`, `duration`) must be present, and numeric fields must be JSON
//! numbers or null.

use std::collections::BTreeMap;

use serde_json::value::RawValue;
use serde_json::{Map, Value};

use crate::config::{AggregationConfig, CampaignPolicy, ValidationMode};
use crate::error::Rejection;
use crate::event::{Dimension, Event};

/// Fields an event cannot be aggregated without.
pub const REQUIRED_FIELDS: [&str; 4] = [
    "campaign_id",
    "client_price_amount",
    "device_type",
    "duration",
];

/// Fields read as numbers.
const NUMERIC_FIELDS: [&str; 2] = ["client_price_amount", "duration"];

/// Parse and normalize one line of input.
pub fn normalize_line(line: &str, config: &AggregationConfig) -> Result<Event, Rejection> {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => match parse_out_of_range(line) {
            Some(fields) => return normalize_object(&fields, config),
            None => return Err(Rejection::malformed(format!("invalid JSON: {}", e))),
        },
    };

    match value {
        Value::Object(fields) => normalize_object(&fields, config),
        other => Err(Rejection::malformed(format!(
            "expected a JSON object, found {}",
            json_type_name(&other)
        ))),
    }
}

/// Second pass for objects `Value` refuses because a number overflows `f64`.
///
/// Raw values skip number conversion, so every field is re-read on its own.
/// A field that still fails to parse is an out-of-range number (or holds one):
/// numeric fields become null, scalar text fields keep the literal, and
/// containers keep their type with no content.
fn parse_out_of_range(line: &str) -> Option<Map<String, Value>> {
    let raw: BTreeMap<String, Box<RawValue>> = serde_json::from_str(line).ok()?;

    let fields = raw
        .into_iter()
        .map(|(name, raw)| {
            let value = serde_json::from_str::<Value>(raw.get()).unwrap_or_else(|_| {
                let text = raw.get();
                if text.starts_with('[') {
                    Value::Array(Vec::new())
                } else if text.starts_with('{') {
                    Value::Object(Map::new())
                } else if NUMERIC_FIELDS.contains(&name.as_str()) {
                    Value::Null
                } else {
                    Value::String(text.to_string())
                }
            });
            (name, value)
        })
        .collect();
    Some(fields)
}

/// Normalize an already-parsed JSON object.
pub fn normalize_object(
    fields: &Map<String, Value>,
    config: &AggregationConfig,
) -> Result<Event, Rejection> {
    if config.validation_mode == ValidationMode::Strict {
        if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !fields.contains_key(**f)) {
            return Err(Rejection::missing_field(missing));
        }
    }

    let (client_price_amount, duration) = match config.validation_mode {
        ValidationMode::Lenient => (
            coerce_number(fields.get("client_price_amount")),
            coerce_number(fields.get("duration")),
        ),
        ValidationMode::Strict => (
            strict_number(fields, "client_price_amount")?,
            strict_number(fields, "duration")?,
        ),
    };

    let event = Event {
        impression_id: text_field(fields, "impression_id")?,
        event_datetime: text_field(fields, "datetime")?,
        campaign_id: text_field(fields, "campaign_id")?,
        device_type: text_field(fields, "device_type")?,
        quartile: text_field(fields, "quartile")?,
        client_price_amount,
        duration,
    };

    if config.campaign_policy == CampaignPolicy::Drop && !event.campaign_id.is_defined() {
        return Err(Rejection::missing_field("campaign_id"));
    }

    Ok(event)
}

fn text_field(fields: &Map<String, Value>, name: &str) -> Result<Dimension, Rejection> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(Dimension::undefined()),
        Some(Value::String(s)) => Ok(Dimension::new(s.as_str())),
        Some(Value::Number(n)) => Ok(Dimension::new(n.to_string())),
        Some(Value::Bool(b)) => Ok(Dimension::new(b.to_string())),
        Some(other) => Err(Rejection::invalid_type(name, json_type_name(other))),
    }
}

/// Best-effort float coercion; anything unusable is `0.0`.
fn coerce_number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn strict_number(fields: &Map<String, Value>, name: &str) -> Result<f64, Rejection> {
    match fields.get(name) {
        None => Err(Rejection::missing_field(name)),
        Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => Ok(n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0)),
        Some(other) => Err(Rejection::invalid_type(name, json_type_name(other))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
