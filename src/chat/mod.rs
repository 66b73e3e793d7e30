mod message;
mod usage;

pub use message::{ChatMessage, ChatMessageBuilder, ChatRole};
pub use usage::{CompletionTokensDetails, PromptTokensDetails, Usage};
