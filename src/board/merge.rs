//! Shallow merge of partial entity payloads.
//!
//! Incoming task, agent and approval payloads are kept as raw JSON objects
//! until they meet the local copy: keys present in the patch overwrite
//! (an explicit `null` clears), keys absent keep their current value.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A partial entity as received from the wire.
pub type Patch = Map<String, Value>;

/// The `id` of a patch, if it carries a string one.
pub fn patch_id(patch: &Patch) -> Option<&str> {
    patch.get("id").and_then(Value::as_str)
}

/// Build a new entity from a patch, applying field defaults.
pub fn build<T: DeserializeOwned>(patch: &Patch) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(patch.clone()))
}

/// Overlay `patch` onto `current`.
pub fn apply<T>(current: &T, patch: &Patch) -> Result<T, serde_json::Error>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged = match serde_json::to_value(current)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }
    serde_json::from_value(Value::Object(merged))
}
