use std::fs;
use std::path::Path;

use super::error::ConfigError;
use super::types::NodeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

pub fn parse_node_config(contents: &str, format: ConfigFormat) -> Result<NodeConfig, ConfigError> {
    let config = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(contents)?,
        ConfigFormat::Toml => toml::from_str(contents)?,
        ConfigFormat::Json => serde_json::from_str(contents)?,
    };
    Ok(config)
}

/// Reads a node configuration, picking the parser from the file extension.
pub fn load_node_config(path: impl AsRef<Path>) -> Result<NodeConfig, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let contents = fs::read_to_string(path)?;
    let config = parse_node_config(&contents, format)?;
    log::debug!(
        "loaded node config {} (version {}, {} item override(s))",
        path.display(),
        config.node_version,
        config.items.len()
    );
    Ok(config)
}
