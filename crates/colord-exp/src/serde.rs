use colord_core::errors::{ErrorInfo, SweepError};
use serde::Serialize;

fn map_err(err: serde_json::Error, code: &str) -> SweepError {
    SweepError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Serialises `value` to JSON with object keys in sorted order.
///
/// The payload is routed through [`serde_json::Value`], whose map type keeps
/// keys sorted, so equal values always produce identical bytes.
pub fn to_canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, SweepError> {
    let value = serde_json::to_value(value).map_err(|err| map_err(err, "canonical-encode"))?;
    serde_json::to_vec(&value).map_err(|err| map_err(err, "canonical-write"))
}

