use alloy_primitives::Address;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiagError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Deployment file not found: {0}")]
    DeploymentFileNotFound(String),

    #[error("Failed to parse deployment file: {0}")]
    DeploymentParseError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid pair: both tokens are {0}")]
    InvalidPair(Address),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DiagError>;
