use thiserror::Error;

/// Error types that can occur while configuring or invoking the chat model node.
#[derive(Debug, Error)]
pub enum LLMError {
    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// Authentication and authorization errors
    #[error("Auth error: {0}")]
    AuthError(String),
    /// Invalid request parameters or format
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Errors returned by the LLM provider or the tracing backend
    #[error("Provider error: {0}")]
    ProviderError(String),
    /// API response parsing or format error
    #[error("Response format error: {message}. Raw response: {raw_response}")]
    ResponseFormatError {
        message: String,
        raw_response: String,
    },
    /// Generic error
    #[error("Generic error: {0}")]
    Generic(String),
    /// JSON serialization/deserialization errors
    #[error("JSON parse error: {0}")]
    JsonError(String),
    /// A node parameter holding embedded JSON could not be parsed
    #[error("Failed to parse {field}: {message}")]
    InvalidJson { field: String, message: String },
    /// Credentials missing or unusable
    #[error("Credential error: {0}")]
    CredentialError(String),
    /// Retry attempts exceeded
    #[error("Retry attempts exceeded after {attempts} tries: {last_error}")]
    RetryExceeded { attempts: usize, last_error: String },
}

/// Converts reqwest HTTP errors into LlmErrors
impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        LLMError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for LLMError {
    fn from(err: serde_json::Error) -> Self {
        LLMError::JsonError(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}

impl LLMError {
    pub(crate) fn invalid_json(field: &str, err: serde_json::Error) -> Self {
        LLMError::InvalidJson {
            field: field.to_string(),
            message: err.to_string(),
        }
    }
}
