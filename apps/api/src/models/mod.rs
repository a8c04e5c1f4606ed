pub mod assessment;
pub mod candidate;
pub mod job;
pub mod research;

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

/// Field deserializer for records produced by semantic extraction.
///
/// The model may omit a key, send `null`, or send a value of the wrong shape;
/// all three collapse to the field's default instead of failing the record.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
