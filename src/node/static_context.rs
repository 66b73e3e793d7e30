use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;

use crate::callbacks::DEFAULT_LANGFUSE_BASE_URL;
use crate::config::NodeConfig;
use crate::error::LLMError;
use crate::secret_store::SecretStore;

use super::context::ExecutionContext;
use super::credentials::OpenAiLangfuseCredentials;

/// Environment variables consulted for credentials missing from the config.
pub mod env {
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
    pub const LANGFUSE_BASE_URL: &str = "LANGFUSE_BASE_URL";
    pub const LANGFUSE_PUBLIC_KEY: &str = "LANGFUSE_PUBLIC_KEY";
    pub const LANGFUSE_SECRET_KEY: &str = "LANGFUSE_SECRET_KEY";
}

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// [`ExecutionContext`] backed by a [`NodeConfig`].
///
/// Credentials resolve in order: config file, environment, secret store.
pub struct StaticContext {
    config: NodeConfig,
    secrets: Option<SecretStore>,
    env: EnvLookup,
}

impl StaticContext {
    pub fn new(config: NodeConfig) -> Self {
        Self {
            config,
            secrets: None,
            env: Arc::new(|name| std::env::var(name).ok()),
        }
    }

    pub fn with_secret_store(mut self, store: SecretStore) -> Self {
        self.secrets = Some(store);
        self
    }

    /// Replaces the process environment as the second credential source.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    fn lookup(&self, configured: &Option<String>, env_name: &str) -> Option<String> {
        let non_blank = |value: &String| !value.trim().is_empty();
        configured
            .clone()
            .filter(non_blank)
            .or_else(|| (self.env)(env_name).filter(non_blank))
            .or_else(|| {
                self.secrets
                    .as_ref()
                    .and_then(|store| store.get(env_name).cloned())
                    .filter(non_blank)
            })
    }

    fn require(&self, configured: &Option<String>, env_name: &str) -> Result<String, LLMError> {
        self.lookup(configured, env_name).ok_or_else(|| {
            LLMError::CredentialError(format!(
                "{env_name} is not set in the config, the environment or the secret store"
            ))
        })
    }
}

#[async_trait]
impl ExecutionContext for StaticContext {
    fn node_version(&self) -> f64 {
        self.config.node_version
    }

    fn node_name(&self) -> &str {
        &self.config.node_name
    }

    fn node_parameter(&self, name: &str, item_index: usize) -> Option<Value> {
        self.config.parameter(name, item_index).cloned()
    }

    async fn credentials(&self) -> Result<OpenAiLangfuseCredentials, LLMError> {
        let configured = &self.config.credentials;
        Ok(OpenAiLangfuseCredentials {
            api_key: SecretString::new(self.require(&configured.api_key, env::OPENAI_API_KEY)?),
            url: self.lookup(&configured.url, env::OPENAI_BASE_URL),
            organization_id: configured.organization_id.clone(),
            header_name: configured.header_name.clone(),
            header_value: configured.header_value.clone(),
            langfuse_base_url: self
                .lookup(&configured.langfuse_base_url, env::LANGFUSE_BASE_URL)
                .unwrap_or_else(|| DEFAULT_LANGFUSE_BASE_URL.to_string()),
            langfuse_public_key: self
                .require(&configured.langfuse_public_key, env::LANGFUSE_PUBLIC_KEY)?,
            langfuse_secret_key: SecretString::new(
                self.require(&configured.langfuse_secret_key, env::LANGFUSE_SECRET_KEY)?,
            ),
        })
    }
}
