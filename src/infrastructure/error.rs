use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Session store error: {0}")]
    Store(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Host bridge error: {0}")]
    Bridge(String),
}
