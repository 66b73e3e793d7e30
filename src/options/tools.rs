use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provider-side capabilities attached to Responses API requests.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltInTools {
    #[serde(default)]
    pub web_search: Option<WebSearchOptions>,
    #[serde(default)]
    pub file_search: Option<FileSearchOptions>,
    #[serde(default)]
    pub code_interpreter: bool,
}

impl BuiltInTools {
    pub fn is_empty(&self) -> bool {
        self.web_search.is_none() && self.file_search.is_none() && !self.code_interpreter
    }
}

/// How much search context the model may pull into its window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchContextSize {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSearchOptions {
    #[serde(default)]
    pub search_context_size: SearchContextSize,
    /// Comma-separated list of domains
    #[serde(default)]
    pub allowed_domains: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSearchOptions {
    /// JSON array of vector store ids, as a string or an array
    #[serde(default)]
    pub vector_store_ids: Option<Value>,
    /// JSON filter object, as a string or an object
    #[serde(default)]
    pub filters: Option<Value>,
    #[serde(default)]
    pub max_results: Option<u32>,
}
