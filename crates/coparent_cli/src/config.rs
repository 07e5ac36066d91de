//! CLI configuration at `<config_dir>/coparent/config.toml`.

use anyhow::{Context, Result};
use coparent_core::default_log_level;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const USER_ENV_VAR: &str = "COPARENT_USER";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub db_path: Option<PathBuf>,
    /// Identity used for every command; unset means signed out.
    pub user_id: Option<Uuid>,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("could not determine config directory")?
            .join("coparent");
        Ok(config_dir.join("config.toml"))
    }

    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config `{}`", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config `{}`", path.display()))
    }

    /// Replaces `user_id` with the value of [`USER_ENV_VAR`] when set.
    pub fn with_user_override(mut self, value: Option<String>) -> Result<Self> {
        if let Some(raw) = value.filter(|raw| !raw.trim().is_empty()) {
            let user = Uuid::parse_str(raw.trim())
                .with_context(|| format!("{USER_ENV_VAR} is not a valid uuid"))?;
            self.user_id = Some(user);
        }
        Ok(self)
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("coparent.db")),
        }
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        match &self.logging.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(data_dir()?.join("logs")),
        }
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .level
            .as_deref()
            .unwrap_or(default_log_level())
    }
}

fn data_dir() -> Result<PathBuf> {
    Ok(dirs::data_dir()
        .context("could not determine data directory")?
        .join("coparent"))
}
