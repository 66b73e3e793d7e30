use secrecy::SecretString;

use crate::options::LangfuseContext;

use super::chat_model_builder::ChatModelBuilder;

impl ChatModelBuilder {
    /// Set the Langfuse host; defaults to the cloud instance.
    pub fn langfuse_base_url(mut self, url: impl Into<String>) -> Self {
        self.state.langfuse_base_url = Some(url.into());
        self
    }

    /// Set the Langfuse project keys. Tracing is enabled once both are set.
    pub fn langfuse_keys(
        mut self,
        public_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.state.langfuse_public_key = Some(public_key.into());
        self.state.langfuse_secret_key = Some(SecretString::new(secret_key.into()));
        self
    }

    /// Set the session, user, tags and custom metadata attached to traces.
    pub fn langfuse_context(mut self, context: LangfuseContext) -> Self {
        self.state.langfuse_context = context;
        self
    }

    /// Use a preconfigured HTTP client for ingestion requests.
    pub fn langfuse_client(mut self, client: reqwest::Client) -> Self {
        self.state.langfuse_client = Some(client);
        self
    }
}
