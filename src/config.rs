// Runtime configuration for the statement API
// Defaults mirror a self-contained install: the store sits next to the binary

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// File name of the SQLite store
pub const DB_FILE_NAME: &str = "banko.db";

/// Default listen port, bound on all interfaces
pub const DEFAULT_PORT: u16 = 5000;

/// Environment overrides
pub const ENV_DB_PATH: &str = "BANKO_DB_PATH";
pub const ENV_BIND: &str = "BANKO_BIND";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path to the SQLite store opened on every request
    pub db_path: PathBuf,
    /// Socket address the HTTP server listens on
    pub bind: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: install_dir().join(DB_FILE_NAME),
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
        }
    }
}

impl Config {
    /// Build a config for an explicit store path, keeping the default bind address
    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    /// Default config with `BANKO_DB_PATH` / `BANKO_BIND` applied when set
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.is_empty()) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(bind) = lookup(ENV_BIND).filter(|b| !b.is_empty()) {
            config.bind = bind
                .parse()
                .with_context(|| format!("Invalid {} value: {:?}", ENV_BIND, bind))?;
        }

        Ok(config)
    }
}

/// Directory holding the running executable, or the working directory as a fallback
fn install_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
