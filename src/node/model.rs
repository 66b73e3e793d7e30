use either::Either;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::LLMError;

/// Node versions from this one on store the model as a resource locator.
pub const RESOURCE_LOCATOR_MIN_VERSION: f64 = 1.2;

/// Resource-locator parameter value: `{ "__rl": true, "mode": "list", "value": "gpt-4o" }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceLocator {
    #[serde(rename = "__rl", default)]
    pub rl: bool,
    #[serde(default)]
    pub mode: Option<String>,
    pub value: String,
    #[serde(default, rename = "cachedResultName")]
    pub cached_result_name: Option<String>,
}

/// The model parameter as stored by either node generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSelection(pub Either<String, ResourceLocator>);

impl<'de> Deserialize<'de> for ModelSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        either::serde_untagged::deserialize(deserializer).map(ModelSelection)
    }
}

impl ModelSelection {
    pub fn id(&self) -> &str {
        match &self.0 {
            Either::Left(id) => id,
            Either::Right(locator) => &locator.value,
        }
    }
}

/// Resolves the model id from the raw `model` parameter.
///
/// Older nodes only accept a plain string; newer ones expect a resource
/// locator but still take a string.
pub fn resolve_model(node_version: f64, raw: Option<Value>) -> Result<String, LLMError> {
    let raw = raw.ok_or_else(|| LLMError::InvalidRequest("No model selected".to_string()))?;
    let model = if node_version < RESOURCE_LOCATOR_MIN_VERSION {
        match raw {
            Value::String(id) => id,
            other => {
                return Err(LLMError::InvalidRequest(format!(
                    "Model must be a string for node version {node_version}, got {other}"
                )))
            }
        }
    } else {
        serde_json::from_value::<ModelSelection>(raw)
            .map_err(|e| LLMError::InvalidRequest(format!("Invalid model selection: {e}")))?
            .id()
            .to_string()
    };
    let model = model.trim().to_string();
    if model.is_empty() {
        return Err(LLMError::InvalidRequest("No model selected".to_string()));
    }
    Ok(model)
}
