//! OpenAI chat client used as the node's output.
//!
//! Speaks the Chat Completions API in legacy mode and the Responses API when
//! the alternate mode is enabled. Every invocation is reported to the attached
//! [`Callbacks`](crate::callbacks::Callbacks).

#[path = "client/config.rs"]
mod config;

#[path = "client/request.rs"]
mod request;

#[path = "client/response.rs"]
mod response;

#[path = "client/retry.rs"]
mod retry;

#[path = "client/chat_openai.rs"]
mod chat_openai;

pub use chat_openai::{ChatOpenAI, TOOLS_METADATA_KEY};
pub use config::{ChatOpenAIFields, NetworkConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use retry::RetryPolicy;

#[cfg(test)]
#[path = "client/tests.rs"]
mod tests;
