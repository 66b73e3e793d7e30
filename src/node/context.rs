use async_trait::async_trait;
use serde_json::Value;

use crate::error::LLMError;

use super::credentials::OpenAiLangfuseCredentials;

/// Node parameter names read by the entry point.
pub mod params {
    pub const MODEL: &str = "model";
    pub const OPTIONS: &str = "options";
    pub const LANGFUSE_METADATA: &str = "langfuseMetadata";
    pub const RESPONSES_API_ENABLED: &str = "responsesApiEnabled";
    pub const BUILT_IN_TOOLS: &str = "builtInTools";
}

/// What the hosting engine exposes to a node while it runs.
#[async_trait]
pub trait ExecutionContext: Send + Sync {
    /// Version of the node definition the workflow was saved with.
    fn node_version(&self) -> f64;

    fn node_name(&self) -> &str;

    /// Raw parameter value for one input item; `None` when unset.
    fn node_parameter(&self, name: &str, item_index: usize) -> Option<Value>;

    async fn credentials(&self) -> Result<OpenAiLangfuseCredentials, LLMError>;
}
