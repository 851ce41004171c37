use crate::error::ApiError;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const USER_AGENT: &str = concat!("vspc-dash/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpOptions {
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
        }
    }
}

/// Every request gets an explicit timeout; nothing is retried.
pub fn build_client(options: &HttpOptions) -> Result<Client, ApiError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(options.timeout)
        .danger_accept_invalid_certs(options.accept_invalid_certs)
        .build()
        .map_err(ApiError::Network)
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Vec<T>,
}

/// Checks for a 2xx status and unwraps the `{ "data": [...] }` envelope.
pub(crate) async fn read_envelope<T: DeserializeOwned>(
    response: Response,
    path: &str,
) -> Result<Vec<T>, ApiError> {
    let status = response.status();
    if !status.is_success() {
        if let Ok(body) = response.text().await {
            debug!(path, status = status.as_u16(), body = %body, "Request rejected");
        }
        return Err(ApiError::Api {
            path: path.to_string(),
            status: status.as_u16(),
        });
    }
    let body = response.bytes().await.map_err(ApiError::Network)?;
    parse_envelope(&body, path)
}

fn parse_envelope<T: DeserializeOwned>(body: &[u8], path: &str) -> Result<Vec<T>, ApiError> {
    let envelope: Envelope<T> =
        serde_json::from_slice(body).map_err(|err| ApiError::Decode {
            path: path.to_string(),
            message: err.to_string(),
        })?;
    Ok(envelope.data)
}
