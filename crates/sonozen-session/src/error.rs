use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Auth { status: u16, message: String },

    #[error("Invalid identity response: {0}")]
    InvalidResponse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sonozen_storage::StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;
