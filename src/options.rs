//! Node option records as read from the hosting engine.
//!
//! Every record deserializes from the camelCase JSON the engine hands over and
//! fills in defaults for absent fields, so downstream construction never sees
//! an undefined timeout, retry count or temperature.

#[path = "options/record.rs"]
mod record;

#[path = "options/effort.rs"]
mod effort;

#[path = "options/tools.rs"]
mod tools;

#[path = "options/langfuse.rs"]
mod langfuse;

pub use effort::ReasoningEffort;
pub use langfuse::{LangfuseContext, DEFAULT_SESSION_ID};
pub use record::{ChatOptions, DEFAULT_MAX_RETRIES, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_MS};
pub(crate) use record::non_empty;
pub use tools::{BuiltInTools, FileSearchOptions, SearchContextSize, WebSearchOptions};
