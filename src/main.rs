use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::env;
use std::path::{Path, PathBuf};

use banko::{insert_records, load_csv, logging, setup_database, Config};

const USAGE: &str = "Usage:
  banko init [DB]            Create the customers/transactions tables
  banko import <CSV> [DB]    Load transactions (and their customers) from CSV

DB defaults to banko.db next to this executable (override with BANKO_DB_PATH).";

fn main() -> Result<()> {
    logging::init_tracing()?;

    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("init") => run_init(&db_path_arg(args.get(1))?),
        Some("import") => {
            let Some(csv_path) = args.get(1) else {
                bail!("missing CSV path\n\n{}", USAGE);
            };
            run_import(Path::new(csv_path), &db_path_arg(args.get(2))?)
        }
        Some("-h") | Some("--help") | Some("help") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(other) => bail!("unknown command: {}\n\n{}", other, USAGE),
        None => bail!("no command given\n\n{}", USAGE),
    }
}

fn db_path_arg(arg: Option<&String>) -> Result<PathBuf> {
    match arg {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(Config::from_env()?.db_path),
    }
}

fn open_store(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    setup_database(&conn)?;
    Ok(conn)
}

fn run_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing store...");
    open_store(db_path)?;
    println!("✓ Schema ready: {}", db_path.display());
    Ok(())
}

fn run_import(csv_path: &Path, db_path: &Path) -> Result<()> {
    println!("🏦 Banko fixture import - CSV → SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\n📂 Loading CSV...");
    let records = load_csv(csv_path)?;
    println!("✓ Loaded {} records from {}", records.len(), csv_path.display());

    println!("\n💾 Inserting into {}...", db_path.display());
    let mut conn = open_store(db_path)?;
    let summary = insert_records(&mut conn, &records)?;

    println!("✓ Transactions inserted: {}", summary.transactions);
    println!("✓ New customers: {}", summary.new_customers);
    tracing::info!(
        transactions = summary.transactions,
        new_customers = summary.new_customers,
        "import complete"
    );

    Ok(())
}
