use std::collections::BTreeMap;
use std::sync::Arc;

use secrecy::SecretString;

use crate::callbacks::CallbackHandler;
use crate::options::{BuiltInTools, ChatOptions, LangfuseContext};

#[derive(Default)]
pub(crate) struct BuilderState {
    pub(crate) api_key: Option<SecretString>,
    pub(crate) model: Option<String>,
    pub(crate) options: ChatOptions,
    pub(crate) responses_api: bool,
    pub(crate) builtin_tools: BuiltInTools,
    pub(crate) base_url: Option<String>,
    pub(crate) proxy: Option<String>,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) node_name: Option<String>,
    pub(crate) langfuse_base_url: Option<String>,
    pub(crate) langfuse_public_key: Option<String>,
    pub(crate) langfuse_secret_key: Option<SecretString>,
    pub(crate) langfuse_context: LangfuseContext,
    pub(crate) langfuse_client: Option<reqwest::Client>,
    pub(crate) extra_handlers: Vec<Arc<dyn CallbackHandler>>,
}

impl BuilderState {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}
