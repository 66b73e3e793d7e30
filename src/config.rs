//! File-based node configuration used outside a hosting engine.

#[path = "config/error.rs"]
mod error;

#[path = "config/types.rs"]
mod types;

#[path = "config/load.rs"]
mod load;

pub use error::ConfigError;
pub use load::{load_node_config, parse_node_config, ConfigFormat};
pub use types::{CredentialsConfig, NodeConfig, DEFAULT_NODE_VERSION};
