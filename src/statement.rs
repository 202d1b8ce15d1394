// 🧾 Monthly statement model
// One customer, one month: the ordered lines plus credit/debit totals

use serde::Serialize;

// ============================================================================
// DIRECTION
// ============================================================================

/// Transaction direction as stored in the `type` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Increases the balance
    Credit,
    /// Decreases the balance
    Debit,
}

impl Direction {
    /// Exact, case-sensitive match on the stored label
    pub fn parse(label: &str) -> Option<Direction> {
        match label {
            "CREDIT" => Some(Direction::Credit),
            "DEBIT" => Some(Direction::Debit),
            _ => None,
        }
    }
}

// ============================================================================
// STATEMENT LINE
// ============================================================================

/// A transaction row as it appears inside a statement.
/// Text columns are nullable in the store and serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementLine {
    pub date: Option<String>,
    pub category: Option<String>,
    pub amount: f64,
    /// Raw `type` label; anything other than CREDIT/DEBIT (or NULL) is kept but not totalled
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
}

impl StatementLine {
    pub fn direction(&self) -> Option<Direction> {
        self.kind.as_deref().and_then(Direction::parse)
    }
}

// ============================================================================
// STATEMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub customer: String,
    pub month: String,
    pub total_credit: f64,
    pub total_debit: f64,
    pub closing_balance: f64,
    pub transactions: Vec<StatementLine>,
}

impl Statement {
    /// Build a statement from lines already ordered by date
    pub fn new(customer: &str, month: &str, transactions: Vec<StatementLine>) -> Self {
        let total_credit = sum_direction(&transactions, Direction::Credit);
        let total_debit = sum_direction(&transactions, Direction::Debit);

        Statement {
            customer: customer.to_string(),
            month: month.to_string(),
            total_credit,
            total_debit,
            closing_balance: total_credit - total_debit,
            transactions,
        }
    }
}

/// Plain floating-point sum of the amounts in one direction
pub fn sum_direction(lines: &[StatementLine], direction: Direction) -> f64 {
    lines
        .iter()
        .filter(|line| line.direction() == Some(direction))
        .map(|line| line.amount)
        .sum()
}
