use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Descriptor error: {0}")]
    Descriptor(String),

    #[error("Optimization error: {0}")]
    Optimization(String),

    #[error("Materialize error: {0}")]
    Materialize(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type ForgeResult<T> = Result<T, ForgeError>;
