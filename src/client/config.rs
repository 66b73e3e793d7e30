use std::collections::BTreeMap;

use secrecy::SecretString;
use serde_json::{Map, Value};

use crate::callbacks::Callbacks;
use crate::mapper::{DirectFields, ExtraParameters};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Transport settings for the HTTP client.
#[derive(Debug, Clone, Default)]
pub struct NetworkConfig {
    /// Overrides any base URL found in the direct fields
    pub base_url: Option<String>,
    /// Proxy URL applied to every request
    pub proxy: Option<String>,
    pub default_headers: BTreeMap<String, String>,
}

/// Constructor arguments for [`ChatOpenAI`](super::ChatOpenAI).
#[derive(Debug)]
pub struct ChatOpenAIFields {
    pub api_key: SecretString,
    pub model: String,
    pub direct: DirectFields,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub network: NetworkConfig,
    pub callbacks: Callbacks,
    pub metadata: Map<String, Value>,
    pub model_kwargs: ExtraParameters,
    pub use_responses_api: bool,
}

impl ChatOpenAIFields {
    /// Fields with library defaults for everything but the key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            model: model.into(),
            direct: DirectFields::default(),
            timeout_ms: crate::options::DEFAULT_TIMEOUT_MS,
            max_retries: crate::options::DEFAULT_MAX_RETRIES,
            network: NetworkConfig::default(),
            callbacks: Callbacks::default(),
            metadata: Map::new(),
            model_kwargs: ExtraParameters::default(),
            use_responses_api: false,
        }
    }
}
