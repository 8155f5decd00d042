use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Base URL is missing: configure `base_url` before rendering")]
    MissingBaseUrl,

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Unknown {kind} '{value}'")]
    UnknownValue { kind: &'static str, value: String },

    #[error("Invalid static page path '{0}': paths must start with '/'")]
    InvalidPagePath(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
