//! Error types for host operations

use asbridge_core::{BridgeError, EntityId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Entity {} does not exist", .0.get())]
    InvalidEntity(EntityId),

    #[error("Entity id space exhausted")]
    IdsExhausted,

    #[error("Path escapes the resource directory: {0}")]
    PathOutsideResource(String),

    #[error("Unsupported host operation: {0}")]
    Unsupported(&'static str),
}

impl From<HostError> for BridgeError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::ResourceNotFound(name) => BridgeError::NotFound(name),
            other => BridgeError::Host(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, HostError>;
