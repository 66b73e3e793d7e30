//! Engine-facing entry point.
//!
//! [`supply_data`] reads the node parameters and credentials for one workflow
//! item from an [`ExecutionContext`] and hands back a traced chat client.

#[path = "node/context.rs"]
mod context;

#[path = "node/credentials.rs"]
mod credentials;

#[path = "node/model.rs"]
mod model;

#[path = "node/static_context.rs"]
mod static_context;

#[path = "node/supply.rs"]
mod supply;

pub use context::{params, ExecutionContext};
pub use credentials::OpenAiLangfuseCredentials;
pub use model::{resolve_model, ModelSelection, ResourceLocator, RESOURCE_LOCATOR_MIN_VERSION};
pub use static_context::{env, StaticContext};
pub use supply::{supply_data, SupplyData};
