use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::callbacks::DEFAULT_LANGFUSE_BASE_URL;
use crate::error::LLMError;
use crate::options::non_empty;

/// Credential record combining the OpenAI key with the Langfuse project keys.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiLangfuseCredentials {
    pub api_key: SecretString,
    /// Overrides the OpenAI base URL
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub header_name: Option<String>,
    #[serde(default)]
    pub header_value: Option<String>,
    #[serde(default = "default_langfuse_base_url")]
    pub langfuse_base_url: String,
    pub langfuse_public_key: String,
    pub langfuse_secret_key: SecretString,
}

fn default_langfuse_base_url() -> String {
    DEFAULT_LANGFUSE_BASE_URL.to_string()
}

impl OpenAiLangfuseCredentials {
    pub fn new(
        api_key: impl Into<String>,
        langfuse_public_key: impl Into<String>,
        langfuse_secret_key: impl Into<String>,
    ) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            url: None,
            organization_id: None,
            header_name: None,
            header_value: None,
            langfuse_base_url: default_langfuse_base_url(),
            langfuse_public_key: langfuse_public_key.into(),
            langfuse_secret_key: SecretString::new(langfuse_secret_key.into()),
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        non_empty(&self.url)
    }

    pub fn organization_id(&self) -> Option<&str> {
        non_empty(&self.organization_id)
    }

    /// The custom header, when both its name and value are set.
    pub fn custom_header(&self) -> Option<(&str, &str)> {
        Some((non_empty(&self.header_name)?, non_empty(&self.header_value)?))
    }

    /// Rejects records that cannot authenticate against both services.
    pub fn validate(&self) -> Result<(), LLMError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(LLMError::CredentialError(
                "OpenAI API key is missing".to_string(),
            ));
        }
        if self.langfuse_public_key.trim().is_empty()
            || self.langfuse_secret_key.expose_secret().trim().is_empty()
        {
            return Err(LLMError::CredentialError(
                "Langfuse public and secret keys are required".to_string(),
            ));
        }
        Ok(())
    }
}
