//! Tolerant field decoders for collected tenant exports.
//!
//! The collection layer serializes with `ConvertTo-Json`, which collapses
//! single-element arrays to objects, renders enums as either integers or
//! names, and stringifies nested objects beyond its depth limit. Every
//! decoder here maps an unexpected shape to "absent" instead of failing
//! the whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::trace;

/// Decode an arbitrary value into `T`, treating a shape mismatch as absent.
fn from_value_lenient<T: DeserializeOwned>(value: Value) -> Option<T> {
    if value.is_null() {
        return None;
    }

    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            trace!(error = %e, "dropping field with unexpected shape");
            None
        }
    }
}

/// Optional field of any deserializable type.
pub fn lenient<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(d)?;
    Ok(from_value_lenient(value))
}

/// A list that may arrive as a single object, `null`, or an array with
/// malformed members (which are skipped).
pub fn one_or_many<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(d)?;

    Ok(match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(from_value_lenient)
            .collect(),
        other => from_value_lenient(other)
            .into_iter()
            .collect(),
    })
}

/// Text field; numbers are rendered, blank strings are absent.
pub fn text<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(d)?;
    Ok(value_to_text(&value))
}

pub(crate) fn value_to_text(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    (!s.is_empty()).then_some(s)
}

/// Policy reference: either a plain name or an object carrying `Name`
/// (or `Identity`, as `Tag:<name>`).
pub fn policy_name<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(d)?;

    Ok(match &value {
        Value::Object(map) => map
            .get("Name")
            .and_then(value_to_text)
            .or_else(|| map.get("Identity").and_then(value_to_text)),
        other => value_to_text(other),
    })
}

/// Boolean from `true`, `"True"`, `"yes"`, or `1`.
pub fn flag<'de, D>(d: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(d)?;

    Ok(match value {
        Value::Bool(b) => Some(b),
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Non-negative count from a number or numeric string.
pub fn count<'de, D>(d: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(d)?;

    Ok(match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Raw enum encoding as emitted by the collection layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCode {
    Int(i64),
    Text(String),
}

/// Enum that can be decoded from an integer code or a case-insensitive name.
pub trait CodedEnum: Sized {
    fn from_code(code: i64) -> Option<Self>;
    fn from_name(name: &str) -> Option<Self>;
    fn other(raw: String) -> Self;

    fn decode(raw: RawCode) -> Self {
        match raw {
            RawCode::Int(code) => Self::from_code(code).unwrap_or_else(|| Self::other(code.to_string())),
            RawCode::Text(text) => {
                let trimmed = text.trim();
                if let Ok(code) = trimmed.parse::<i64>() {
                    return Self::from_code(code).unwrap_or_else(|| Self::other(code.to_string()));
                }
                Self::from_name(&trimmed.to_ascii_lowercase()).unwrap_or_else(|| Self::other(trimmed.to_string()))
            }
        }
    }
}

/// Implement `Deserialize` for `CodedEnum` types.
macro_rules! coded_enum_deserialize {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<'de> serde::Deserialize<'de> for $ty {
                fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                    let raw = <$crate::core::snapshot::de::RawCode as serde::Deserialize>::deserialize(d)?;
                    Ok(<$ty as $crate::core::snapshot::de::CodedEnum>::decode(raw))
                }
            }
        )*
    };
}

pub(crate) use coded_enum_deserialize;
