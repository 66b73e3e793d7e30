use std::sync::Arc;

use secrecy::SecretString;

use crate::callbacks::CallbackHandler;
use crate::options::{BuiltInTools, ChatOptions};

use super::state::BuilderState;

/// Name reported by the engine-side tracer when none is set.
pub const DEFAULT_NODE_NAME: &str = "OpenAI Chat Model";

/// Builder for configuring and instantiating a traced [`ChatOpenAI`](crate::client::ChatOpenAI).
pub struct ChatModelBuilder {
    pub(super) state: BuilderState,
}

impl Default for ChatModelBuilder {
    fn default() -> Self {
        Self {
            state: BuilderState::new(),
        }
    }
}

impl ChatModelBuilder {
    /// Creates a new empty builder instance with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key for authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.state.api_key = Some(SecretString::new(key.into()));
        self
    }

    /// Sets the model identifier to use.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.state.model = Some(model.into());
        self
    }

    /// Sets the options record the mapper reads from.
    pub fn options(mut self, options: ChatOptions) -> Self {
        self.state.options = options;
        self
    }

    /// Switches the client to the Responses API.
    pub fn responses_api(mut self, enabled: bool) -> Self {
        self.state.responses_api = enabled;
        self
    }

    /// Sets the hosted tools; only sent when the Responses API is enabled.
    pub fn builtin_tools(mut self, tools: BuiltInTools) -> Self {
        self.state.builtin_tools = tools;
        self
    }

    /// Name used by the logging tracer.
    pub fn node_name(mut self, name: impl Into<String>) -> Self {
        self.state.node_name = Some(name.into());
        self
    }

    /// Appends a callback handler after the built-in ones.
    pub fn callback(mut self, handler: Arc<dyn CallbackHandler>) -> Self {
        self.state.extra_handlers.push(handler);
        self
    }
}
