//! Generation lifecycle callbacks.
//!
//! The chat client reports every generation to a list of [`CallbackHandler`]s:
//! once when it starts, once when it ends with the [`LLMResult`], or once when
//! it fails. Handlers may mutate the result on the way through, which is what
//! [`TokenUsageNormalizer`] relies on.

#[path = "callbacks/result.rs"]
mod result;

#[path = "callbacks/handler.rs"]
mod handler;

#[path = "callbacks/token_usage.rs"]
mod token_usage;

#[path = "callbacks/langfuse.rs"]
mod langfuse;

#[path = "callbacks/logging.rs"]
mod logging;

pub use handler::{CallbackHandler, Callbacks, LLMStart};
pub use langfuse::{LangfuseConfig, LangfuseHandler, DEFAULT_LANGFUSE_BASE_URL};
pub use logging::LoggingTracer;
pub use result::{
    Generation, LLMResult, TokenUsage, ESTIMATED_TOKEN_USAGE_KEY, TOKEN_USAGE_KEY,
};
pub use token_usage::{normalize_token_usage, TokenUsageNormalizer};

#[cfg(test)]
#[path = "callbacks/tests.rs"]
mod tests;
