use serde_json::{Map, Value};

use crate::error::LLMError;

/// Reads a parameter that may hold JSON typed as a string.
///
/// Strings are parsed, blank strings and `null` count as absent, anything else
/// is taken as already-structured JSON.
pub(crate) fn parse_embedded(field: &str, raw: Option<&Value>) -> Result<Option<Value>, LLMError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => serde_json::from_str(text)
            .map(Some)
            .map_err(|e| LLMError::invalid_json(field, e)),
        Some(other) => Ok(Some(other.clone())),
    }
}

pub(crate) fn parse_embedded_object(
    field: &str,
    raw: Option<&Value>,
) -> Result<Option<Map<String, Value>>, LLMError> {
    match parse_embedded(field, raw)? {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(LLMError::InvalidJson {
            field: field.to_string(),
            message: format!("expected a JSON object, got {other}"),
        }),
    }
}
