use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("Tolerance error: {0}")]
    Tolerance(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown tolerance preset: {0}")]
    UnknownPreset(String),
}

pub type Result<T> = std::result::Result<T, DiffError>;
