use serde::Deserialize;

use crate::mutation::CellTransport;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config: {0}")]
    Parse(String),
}

/// Codec settings, parsed from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CodecConfig {
    /// Largest message a reader will parse. Unset means no ceiling.
    #[serde(default)]
    pub max_message_size: Option<usize>,

    /// How mutation and result encoders carry cells unless told otherwise.
    #[serde(default)]
    pub transport: CellTransport,
}

impl CodecConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
