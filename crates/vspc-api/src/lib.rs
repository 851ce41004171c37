pub mod auth;
pub mod client;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod keyring_store;

#[cfg(test)]
pub(crate) mod test_server;

pub use auth::TokenManager;
pub use client::PortalClient;
pub use error::ApiError;
