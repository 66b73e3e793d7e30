use serde::Deserialize;
use serde_json::{Map, Value};

use crate::builder::DEFAULT_NODE_NAME;

/// Version assumed when the file does not pin one.
pub const DEFAULT_NODE_VERSION: f64 = 1.2;

/// One node's saved configuration.
///
/// `parameters` apply to every item; `items[n]` overrides them for item `n`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    #[serde(default = "default_node_version")]
    pub node_version: f64,
    #[serde(default = "default_node_name")]
    pub node_name: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub items: Vec<Map<String, Value>>,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// Credential fields; anything left out is looked up elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsConfig {
    pub api_key: Option<String>,
    pub url: Option<String>,
    pub organization_id: Option<String>,
    pub header_name: Option<String>,
    pub header_value: Option<String>,
    pub langfuse_base_url: Option<String>,
    pub langfuse_public_key: Option<String>,
    pub langfuse_secret_key: Option<String>,
}

fn default_node_version() -> f64 {
    DEFAULT_NODE_VERSION
}

fn default_node_name() -> String {
    DEFAULT_NODE_NAME.to_string()
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_version: DEFAULT_NODE_VERSION,
            node_name: default_node_name(),
            parameters: Map::new(),
            items: Vec::new(),
            credentials: CredentialsConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Parameter value for one item, falling back to the shared parameters.
    pub fn parameter(&self, name: &str, item_index: usize) -> Option<&Value> {
        self.items
            .get(item_index)
            .and_then(|item| item.get(name))
            .or_else(|| self.parameters.get(name))
    }
}
