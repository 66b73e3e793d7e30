#[path = "builder/chat_model_builder.rs"]
mod chat_model_builder;

#[path = "builder/state.rs"]
mod state;

#[path = "builder/network.rs"]
mod network;

#[path = "builder/langfuse.rs"]
mod langfuse;

#[path = "builder/helpers.rs"]
mod helpers;

#[path = "builder/build.rs"]
mod build;

pub use chat_model_builder::{ChatModelBuilder, DEFAULT_NODE_NAME};
