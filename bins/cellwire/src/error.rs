#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] cellwire_codec::ConfigError),

    #[error("{0}")]
    Wire(#[from] cellwire_api::WireError),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("'{path}': {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Usage(String),
}

pub fn read_file(path: &str) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::File { path: path.to_string(), source })
}

pub fn write_file(path: &str, bytes: &[u8]) -> Result<(), CliError> {
    std::fs::write(path, bytes).map_err(|source| CliError::File { path: path.to_string(), source })
}
