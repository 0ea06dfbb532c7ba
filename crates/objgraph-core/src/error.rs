use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObjGraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Visualization error: {0}")]
    Visualization(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// The search pattern is itself rejected by the ignore rule.
    #[error("The pattern '{pattern}' cannot be a part of ignore pattern '{ignore}'")]
    ExcludedPattern { pattern: String, ignore: String },
}

pub type Result<T> = std::result::Result<T, ObjGraphError>;
