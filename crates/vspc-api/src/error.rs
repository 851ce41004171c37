use thiserror::Error;
use vspc_core::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("token request rejected with HTTP {status}")]
    Auth { status: u16 },
    #[error("{path} returned HTTP {status}")]
    Api { path: String, status: u16 },
    #[error("unexpected response from {path}: {message}")]
    Decode { path: String, message: String },
    #[error("not logged in")]
    NoSession,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth { .. })
    }
}
