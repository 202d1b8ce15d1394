// Banko - Statement API server

use anyhow::Result;
use banko::{logging, serve, Config};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing()?;

    let config = Config::from_env()?;

    println!("🏦 Banko API");
    println!("━━━━━━━━━━━━");

    if !config.db_path.exists() {
        eprintln!("❌ Database not found at {:?}", config.db_path);
        eprintln!("   Run: banko import <CSV>");
        eprintln!("   to load transactions first.");
        std::process::exit(1);
    }
    println!("✓ Database: {:?}", config.db_path);

    println!("\n🚀 Server running on http://{}", config.bind);
    println!("   Endpoints: /statement/<customer>/<month>, /customers, /months");
    println!("\n   Press Ctrl+C to stop\n");

    serve(config).await
}
