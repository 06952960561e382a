//! Shared JSON serialization helpers for outbound Diesel adapters.
//!
//! Encode helpers convert domain types to `serde_json::Value` for JSONB
//! persistence. Decode helpers reverse this for read-side adapters, running
//! the domain types' own `Deserialize` validation so malformed payloads
//! surface as typed errors rather than silent data corruption.
//!
//! Unit enums stored in text columns reuse their serde names, so the column
//! value always matches the JSON the API emits.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::Timeline;

/// Encode a sub-document for a JSONB column.
pub(super) fn to_json<T: Serialize>(value: &T, field: &str) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|err| format!("encode {field}: {err}"))
}

/// Encode an optional sub-document for a nullable JSONB column.
pub(super) fn to_optional_json<T: Serialize>(
    value: Option<&T>,
    field: &str,
) -> Result<Option<Value>, String> {
    value.map(|inner| to_json(inner, field)).transpose()
}

/// Newest timeline entry as a one-element JSONB array for appending with
/// `||`, together with the entry count the stored timeline must still have
/// for the append to apply.
pub(super) fn timeline_append<S: Serialize>(
    timeline: &Timeline<S>,
) -> Result<(Value, i32), String> {
    let (newest, earlier) = timeline
        .entries()
        .split_last()
        .ok_or("encode timeline: no entry to append")?;
    let appended = to_json(&[newest], "timeline")?;
    let earlier = i32::try_from(earlier.len())
        .map_err(|_| format!("encode timeline: {} entries", earlier.len()))?;
    Ok((appended, earlier))
}

/// Decode a JSONB column into its domain type.
pub(super) fn from_json<T: DeserializeOwned>(value: Value, field: &str) -> Result<T, String> {
    serde_json::from_value(value).map_err(|err| format!("decode {field}: {err}"))
}

/// Decode a nullable JSONB column.
pub(super) fn from_optional_json<T: DeserializeOwned>(
    value: Option<Value>,
    field: &str,
) -> Result<Option<T>, String> {
    value.map(|inner| from_json(inner, field)).transpose()
}

/// Text form of a unit enum, taken from its serde representation.
///
/// # Examples
///
/// ```rust,ignore
/// assert_eq!(enum_to_text(&ChatType::Direct, "chat_type")?, "direct");
/// ```
pub(super) fn enum_to_text<T: Serialize>(value: &T, field: &str) -> Result<String, String> {
    match to_json(value, field)? {
        Value::String(text) => Ok(text),
        other => Err(format!("encode {field}: expected a string, found {other}")),
    }
}

/// Parse a unit enum from its text column.
pub(super) fn text_to_enum<T: DeserializeOwned>(raw: &str, field: &str) -> Result<T, String> {
    from_json(Value::String(raw.to_owned()), field)
}
