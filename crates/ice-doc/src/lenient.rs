//! Forgiving field deserializers
//!
//! Documents written by older editors carry sub-fields of the wrong shape.
//! These helpers treat such fields as absent instead of failing the whole
//! document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize `T`, falling back to `T::default()` when the value has the
/// wrong shape.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Deserialize a string, accepting numbers and booleans in its place.
pub(crate) fn stringish<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Decode a payload out of an optional JSON value, defaulting when it is
/// missing or malformed.
pub(crate) fn payload<T>(data: Option<Value>) -> T
where
    T: DeserializeOwned + Default,
{
    data.and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "stringish")]
        label: String,
        #[serde(default, deserialize_with = "or_default")]
        items: Vec<u32>,
    }

    #[test]
    fn numbers_become_strings() {
        let sample: Sample = serde_json::from_value(json!({"label": 7})).unwrap();
        assert_eq!(sample.label, "7");
    }

    #[test]
    fn wrong_shape_defaults() {
        let sample: Sample = serde_json::from_value(json!({"items": "nope"})).unwrap();
        assert!(sample.items.is_empty());
    }

    #[test]
    fn payload_tolerates_garbage() {
        let sample: Sample = payload(Some(json!(42)));
        assert_eq!(sample.label, "");
        let sample: Sample = payload(None);
        assert!(sample.items.is_empty());
    }
}
