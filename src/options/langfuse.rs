use either::Either;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::LLMError;
use crate::mapper::parse_embedded_object;

pub const DEFAULT_SESSION_ID: &str = "default-session-id";

/// Attributes used purely for trace grouping on the Langfuse side.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LangfuseContext {
    #[serde(default = "default_session_id")]
    pub session_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Either a comma-separated string or a list
    #[serde(default, with = "either::serde_untagged_optional")]
    pub tags: Option<Either<String, Vec<String>>>,
    #[serde(default)]
    pub custom_metadata: Option<Value>,
}

fn default_session_id() -> String {
    DEFAULT_SESSION_ID.to_string()
}

impl Default for LangfuseContext {
    fn default() -> Self {
        Self {
            session_id: default_session_id(),
            user_id: None,
            tags: None,
            custom_metadata: None,
        }
    }
}

impl LangfuseContext {
    pub fn from_value(value: Option<Value>) -> Result<Self, LLMError> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => serde_json::from_value(value).map_err(|e| {
                LLMError::InvalidRequest(format!("Invalid Langfuse metadata: {e}"))
            }),
        }
    }

    pub fn tags(&self) -> Vec<String> {
        match &self.tags {
            None => Vec::new(),
            Some(Either::Left(raw)) => raw
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Either::Right(list)) => list
                .iter()
                .map(|tag| tag.trim())
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        crate::options::non_empty(&self.user_id)
    }

    /// Parses the custom metadata blob; malformed JSON is an error.
    pub fn metadata(&self) -> Result<Map<String, Value>, LLMError> {
        Ok(parse_embedded_object("customMetadata", self.custom_metadata.as_ref())?
            .unwrap_or_default())
    }
}
