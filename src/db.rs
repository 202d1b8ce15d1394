use anyhow::{Context, Result};
use rusqlite::{params, Connection, OpenFlags};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use crate::statement::{Statement, StatementLine};

// ============================================================================
// CONNECTION ACCESSOR
// ============================================================================

/// Open a fresh read-only connection to the store.
///
/// There is no pool: every request gets its own connection and closes it when
/// the value is dropped, including when a query fails halfway through.
/// A missing file is an error rather than an empty database being created.
pub fn open_connection(db_path: &Path) -> rusqlite::Result<Connection> {
    debug!(path = %db_path.display(), "opening store connection");
    Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Create `customers` and `transactions` if they are missing
pub fn setup_database(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS customers (
            name TEXT
        )",
        [],
    )
    .context("Failed to create customers table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            customer TEXT,
            month TEXT,
            date TEXT,
            category TEXT,
            amount REAL,
            type TEXT,
            description TEXT
        )",
        [],
    )
    .context("Failed to create transactions table")?;

    Ok(())
}

// ============================================================================
// QUERIES
// ============================================================================

/// Transactions for one customer and month, oldest first
pub fn get_statement_lines(
    conn: &Connection,
    customer: &str,
    month: &str,
) -> rusqlite::Result<Vec<StatementLine>> {
    let mut stmt = conn.prepare(
        "SELECT date, category, amount, type, description
         FROM transactions
         WHERE customer = ?1 AND month = ?2
         ORDER BY date",
    )?;

    let lines = stmt
        .query_map(params![customer, month], |row| {
            Ok(StatementLine {
                date: row.get("date")?,
                category: row.get("category")?,
                amount: row.get("amount")?,
                kind: row.get("type")?,
                description: row.get("description")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(lines)
}

/// Monthly statement with totals; unknown customer/month yields an empty statement
pub fn get_statement(conn: &Connection, customer: &str, month: &str) -> rusqlite::Result<Statement> {
    let lines = get_statement_lines(conn, customer, month)?;
    debug!(customer, month, lines = lines.len(), "statement loaded");
    Ok(Statement::new(customer, month, lines))
}

/// Every customer name in store order, duplicates and NULLs included
pub fn get_customers(conn: &Connection) -> rusqlite::Result<Vec<Option<String>>> {
    let mut stmt = conn.prepare("SELECT name FROM customers")?;

    let names = stmt
        .query_map([], |row| row.get("name"))?
        .collect::<Result<Vec<Option<String>>, _>>()?;

    Ok(names)
}

/// Distinct months with activity, newest first (text ordering; NULL sorts last)
pub fn get_months(conn: &Connection) -> rusqlite::Result<Vec<Option<String>>> {
    let mut stmt = conn.prepare("SELECT DISTINCT month FROM transactions ORDER BY month DESC")?;

    let months = stmt
        .query_map([], |row| row.get("month"))?
        .collect::<Result<Vec<Option<String>>, _>>()?;

    Ok(months)
}

// ============================================================================
// FIXTURE IMPORT (offline loader, not used by the HTTP service)
// ============================================================================

/// One CSV row: `customer,month,date,category,amount,type,description`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ImportRecord {
    pub customer: String,
    #[serde(default)]
    pub month: String,
    pub date: String,
    pub category: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

impl ImportRecord {
    /// Stored month; derived from the `YYYY-MM` prefix of `date` when blank
    pub fn effective_month(&self) -> String {
        if !self.month.is_empty() {
            return self.month.clone();
        }
        self.date.chars().take(7).collect()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub transactions: usize,
    pub new_customers: usize,
}

pub fn load_csv(csv_path: &Path) -> Result<Vec<ImportRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;

    let mut records = Vec::new();
    for (index, result) in rdr.deserialize().enumerate() {
        let record: ImportRecord = result
            .with_context(|| format!("Failed to deserialize CSV record {}", index + 1))?;
        records.push(record);
    }

    Ok(records)
}

/// Insert records in a single SQLite transaction.
/// Customers are only added when no row with that name exists yet.
pub fn insert_records(conn: &mut Connection, records: &[ImportRecord]) -> Result<ImportSummary> {
    let tx = conn.transaction()?;
    let mut summary = ImportSummary::default();

    {
        let mut insert_tx = tx.prepare(
            "INSERT INTO transactions (customer, month, date, category, amount, type, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        let mut insert_customer = tx.prepare(
            "INSERT INTO customers (name)
             SELECT ?1 WHERE NOT EXISTS (SELECT 1 FROM customers WHERE name = ?1)",
        )?;

        for record in records {
            summary.new_customers += insert_customer.execute(params![record.customer])?;
            summary.transactions += insert_tx.execute(params![
                record.customer,
                record.effective_month(),
                record.date,
                record.category,
                record.amount,
                record.kind,
                record.description,
            ])?;
        }
    }

    tx.commit().context("Failed to commit import")?;
    Ok(summary)
}
