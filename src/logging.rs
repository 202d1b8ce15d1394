//! Tracing setup shared by the server and the importer
//!
//! `RUST_LOG` controls the filter (default: info), e.g.
//!   RUST_LOG=banko=debug,tower_http=debug banko-server

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Initialize console logging; fails if a global subscriber is already set
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
