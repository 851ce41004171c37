use crate::logging;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use time::UtcOffset;
use tracing::{info, warn};
use vspc_api::dashboard::ViewClock;
use vspc_api::http::{HttpOptions, build_client};
use vspc_api::keyring_store::KeyringStore;
use vspc_api::{PortalClient, TokenManager};
use vspc_core::config::{AppConfig, StoreBackend, default_config_path};
use vspc_core::store::{FileStore, KeyValueStore, SessionStore};

mod app;
mod args;
mod config_cmd;
mod render;
mod session_cmd;
mod view_cmd;

use args::*;

use config_cmd::handle_config;
use session_cmd::{handle_login, handle_logout, handle_session};
use view_cmd::{
    handle_alarms, handle_billing, handle_dashboard, handle_jobs, handle_threats, handle_usage,
};

pub async fn run(local_offset: UtcOffset) -> anyhow::Result<()> {
    app::run(local_offset).await
}
