use crate::jobs::{DEFAULT_TREND_DAYS, DEFAULT_WINDOW_HOURS};
use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreBackend,
    /// Overrides the platform data dir location of the session file.
    pub session_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    /// Portals are often deployed with a self-signed certificate.
    pub accept_invalid_certs: bool,
    pub sla_window_hours: i64,
    pub trend_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreBackend::File,
            session_path: None,
            request_timeout_secs: 30,
            accept_invalid_certs: false,
            sla_window_hours: DEFAULT_WINDOW_HOURS,
            trend_days: DEFAULT_TREND_DAYS,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path).context("read config")?;
        let config = serde_json::from_str(&data).context("parse config")?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("create config directory")?;
        }
        let data = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(path, data).context("write config")?;
        Ok(())
    }

    pub fn session_path(&self) -> anyhow::Result<PathBuf> {
        match &self.session_path {
            Some(path) => Ok(path.clone()),
            None => default_session_path(),
        }
    }
}

fn project_dirs() -> anyhow::Result<ProjectDirs> {
    ProjectDirs::from("com", "vspc-dash", "vspc-dash").context("resolve project dirs")
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.json"))
}

pub fn default_session_path() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join("session.json"))
}
