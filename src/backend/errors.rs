use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// Network-level failure: the backend never answered.
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Document not found")]
    NotFound,

    /// The backend answered with a non-success status.
    #[error("Backend rejected request ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response arrived but could not be decoded.
    #[error("Payload error: {0}")]
    Payload(String),

    #[error("Invalid backend configuration: {0}")]
    Config(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            BackendError::Unreachable(err.to_string())
        } else if err.is_decode() {
            BackendError::Payload(err.to_string())
        } else if let Some(status) = err.status() {
            BackendError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            BackendError::Unreachable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Payload(err.to_string())
    }
}
