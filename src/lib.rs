//! OpenAI chat model node with Langfuse tracing.
//!
//! A workflow engine hands the node its parameters and credentials through an
//! [`ExecutionContext`](node::ExecutionContext); [`supply_data`](node::supply_data)
//! maps them onto a [`ChatOpenAI`](client::ChatOpenAI) client whose generations
//! are reported to Langfuse and to the engine's own log.
//!
//! ```no_run
//! use llm_langfuse::{node, config};
//!
//! # async fn run() -> Result<(), llm_langfuse::error::LLMError> {
//! let config = config::load_node_config("node.yaml")?;
//! let ctx = node::StaticContext::new(config);
//! let model = node::supply_data(&ctx, 0).await?.response;
//! let reply = model
//!     .invoke(&[llm_langfuse::chat::ChatMessage::user().content("Hello").build()])
//!     .await?;
//! println!("{}", reply.text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

/// Fluent construction of a traced chat client
pub mod builder;

/// Generation lifecycle callbacks: Langfuse, engine logging, usage normalization
pub mod callbacks;

/// Chat message and token usage types
pub mod chat;

/// HTTP client for the OpenAI chat endpoints
pub mod client;

/// Node configuration files
pub mod config;

/// Error types
pub mod error;

/// Translation of node options into client parameters
pub mod mapper;

/// Engine entry point
pub mod node;

/// Node option records
pub mod options;

/// Secret storage for credentials
pub mod secret_store;

/// One-time logging start-up
pub mod telemetry;

pub use builder::ChatModelBuilder;
pub use client::ChatOpenAI;
pub use error::LLMError;
pub use node::{supply_data, ExecutionContext, SupplyData};
