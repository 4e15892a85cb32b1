//! Extraction of the input object location from a trigger payload.
//!
//! Two shapes are accepted:
//!
//! ```json
//! {"Records":[{"s3":{"bucket":{"name":"b"},"object":{"key":"k"}}}]}
//! {"bucket":"b","key":"k"}
//! ```
//!
//! Keys in storage notifications are URL-encoded with `+` for spaces.
//! Only the first record of a notification is processed.

use serde_json::Value;

use crate::error::{ConnectorError, Result};
use crate::traits::ObjectLocation;

pub fn parse_trigger(event: &Value) -> Result<ObjectLocation> {
    if let Some(records) = event.get("Records") {
        return parse_notification(records);
    }

    match (
        event.get("bucket").and_then(Value::as_str),
        event.get("key").and_then(Value::as_str),
    ) {
        (Some(bucket), Some(key)) if !bucket.is_empty() && !key.is_empty() => {
            Ok(ObjectLocation::new(bucket, key))
        }
        _ => Err(invalid(
            "expected 'Records' or a non-empty 'bucket' and 'key'",
        )),
    }
}

fn parse_notification(records: &Value) -> Result<ObjectLocation> {
    let first = records
        .as_array()
        .ok_or_else(|| invalid("'Records' is not an array"))?
        .first()
        .ok_or_else(|| invalid("'Records' is empty"))?;

    let s3 = first
        .get("s3")
        .ok_or_else(|| invalid("missing 'Records[0].s3'"))?;
    let bucket = s3
        .pointer("/bucket/name")
        .and_then(Value::as_str)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| invalid("missing 'Records[0].s3.bucket.name'"))?;
    let raw_key = s3
        .pointer("/object/key")
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| invalid("missing 'Records[0].s3.object.key'"))?;

    Ok(ObjectLocation::new(bucket, decode_key(raw_key)?))
}

/// Form-style decoding: `+` is a space, then percent escapes.
fn decode_key(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|key| key.into_owned())
        .map_err(|e| invalid(&format!("object key '{}' is not valid UTF-8: {}", raw, e)))
}

fn invalid(msg: &str) -> ConnectorError {
    ConnectorError::InvalidEventStructure(msg.to_string())
}
