// Banko - Core Library
// Read-only statement queries over the SQLite store, plus the HTTP layer

pub mod config;
pub mod db;
pub mod logging;
pub mod statement;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::Config;
pub use db::{
    ImportRecord, ImportSummary,
    open_connection, setup_database, load_csv, insert_records,
    get_statement, get_statement_lines, get_customers, get_months,
};
pub use statement::{Direction, Statement, StatementLine};

#[cfg(feature = "server")]
pub use api::{build_router, serve, ApiError, AppState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
