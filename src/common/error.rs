use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Simulator connection failed: {0}")]
    Connection(String),

    #[error("Malformed state vector: {reason}")]
    Parse { reason: String },

    #[error("Remote call {call} returned status {status}")]
    RemoteCall { call: String, status: i32 },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
