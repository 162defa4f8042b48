//! Core error types for asbridge

#[derive(thiserror::Error, Debug)]
pub enum BridgeError {
    #[error("Script error: {0}")]
    Script(String),

    #[error("Registration error: {0}")]
    Registration(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
