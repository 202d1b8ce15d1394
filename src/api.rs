// 🌐 HTTP surface - read-only statement API with Axum

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::{get_customers, get_months, get_statement, open_connection};
use crate::statement::Statement;

// ============================================================================
// ERRORS
// ============================================================================

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Query task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);

        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

// ============================================================================
// STATE
// ============================================================================

/// Shared, read-only server state; connections are opened per request
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Run `query` on a fresh connection on the blocking pool.
    /// The connection is dropped when the closure returns, on success or error.
    async fn with_connection<T, F>(&self, query: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let config = Arc::clone(&self.config);
        let result = tokio::task::spawn_blocking(move || {
            let conn = open_connection(&config.db_path)?;
            query(&conn)
        })
        .await??;

        Ok(result)
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

#[derive(Serialize)]
pub struct CustomersResponse {
    pub customers: Vec<Option<String>>,
}

#[derive(Serialize)]
pub struct MonthsResponse {
    pub months: Vec<Option<String>>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health - Liveness check, does not touch the store
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /statement/:customer/:month - Monthly statement with totals
async fn statement(
    State(state): State<AppState>,
    Path((customer, month)): Path<(String, String)>,
) -> ApiResult<Json<Statement>> {
    let statement = state
        .with_connection(move |conn| get_statement(conn, &customer, &month))
        .await?;

    Ok(Json(statement))
}

/// GET /customers - All customer names
async fn customers(State(state): State<AppState>) -> ApiResult<Json<CustomersResponse>> {
    let customers = state.with_connection(get_customers).await?;
    Ok(Json(CustomersResponse { customers }))
}

/// GET /months - Distinct months, newest first
async fn months(State(state): State<AppState>) -> ApiResult<Json<MonthsResponse>> {
    let months = state.with_connection(get_months).await?;
    Ok(Json(MonthsResponse { months }))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/statement/:customer/:month", get(statement))
        .route("/customers", get(customers))
        .route("/months", get(months))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the configured address and serve until the process is stopped
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let bind = config.bind;
    let app = build_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_records, setup_database, ImportRecord};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn record(customer: &str, month: &str, date: &str, amount: f64, kind: &str) -> ImportRecord {
        ImportRecord {
            customer: customer.to_string(),
            month: month.to_string(),
            date: date.to_string(),
            category: "misc".to_string(),
            amount,
            kind: kind.to_string(),
            description: "test".to_string(),
        }
    }

    /// File-backed store: every request opens its own connection
    fn seeded_app() -> (TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banko.db");

        let mut conn = Connection::open(&path).unwrap();
        setup_database(&conn).unwrap();
        insert_records(
            &mut conn,
            &[
                record("alice", "2024-01", "2024-01-05", 50.0, "DEBIT"),
                record("alice", "2024-01", "2024-01-10", 2000.0, "CREDIT"),
                record("alice", "2024-02", "2024-02-01", 7.25, "DEBIT"),
                record("bob", "2024-01", "2024-01-20", 10.0, "CREDIT"),
            ],
        )
        .unwrap();
        drop(conn);

        let app = build_router(AppState::new(Config::with_db_path(path)));
        (dir, app)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(AppState::new(Config::with_db_path("/nonexistent/banko.db")));

        let (status, body) = get_json(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_statement_endpoint() {
        let (_dir, app) = seeded_app();

        let (status, body) = get_json(app, "/statement/alice/2024-01").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["customer"], "alice");
        assert_eq!(body["month"], "2024-01");
        assert_eq!(body["total_credit"], 2000.0);
        assert_eq!(body["total_debit"], 50.0);
        assert_eq!(body["closing_balance"], 1950.0);

        let transactions = body["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0]["type"], "DEBIT");
        assert_eq!(transactions[0]["date"], "2024-01-05");
        assert_eq!(transactions[1]["type"], "CREDIT");
        assert_eq!(transactions[1]["description"], "test");
    }

    #[tokio::test]
    async fn test_statement_unknown_customer_is_empty() {
        let (_dir, app) = seeded_app();

        let (status, body) = get_json(app, "/statement/nobody/2030-01").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["customer"], "nobody");
        assert_eq!(body["total_credit"], 0.0);
        assert_eq!(body["total_debit"], 0.0);
        assert_eq!(body["closing_balance"], 0.0);
        assert_eq!(body["transactions"], json!([]));
    }

    #[tokio::test]
    async fn test_statement_decodes_path_segments() {
        let (dir, _) = seeded_app();
        let path = dir.path().join("banko.db");
        let mut conn = Connection::open(&path).unwrap();
        insert_records(&mut conn, &[record("jane doe", "2024-01", "2024-01-02", 3.0, "CREDIT")])
            .unwrap();
        drop(conn);

        let app = build_router(AppState::new(Config::with_db_path(path)));
        let (status, body) = get_json(app, "/statement/jane%20doe/2024-01").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["customer"], "jane doe");
        assert_eq!(body["total_credit"], 3.0);
    }

    #[tokio::test]
    async fn test_customers_endpoint() {
        let (_dir, app) = seeded_app();

        let (status, body) = get_json(app, "/customers").await;

        assert_eq!(status, StatusCode::OK);
        let mut customers: Vec<&str> = body["customers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        customers.sort();
        assert_eq!(customers, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_months_endpoint() {
        let (_dir, app) = seeded_app();

        let (status, body) = get_json(app, "/months").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["months"], json!(["2024-02", "2024-01"]));
    }

    #[tokio::test]
    async fn test_null_values_are_served_as_null() {
        let (dir, _) = seeded_app();
        let path = dir.path().join("banko.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch(
                "INSERT INTO customers (name) VALUES (NULL);
                 INSERT INTO transactions (customer, month, date, category, amount, type, description)
                     VALUES ('alice', '2024-01', '2024-01-07', NULL, 20.0, 'DEBIT', NULL);
                 INSERT INTO transactions (customer, month, date, category, amount, type, description)
                     VALUES ('bob', NULL, '2024-03-01', 'misc', 1.0, 'CREDIT', 'no month');",
            )
            .unwrap();
        let app = build_router(AppState::new(Config::with_db_path(path)));

        let (status, body) = get_json(app.clone(), "/statement/alice/2024-01").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_debit"], 70.0);
        let transactions = body["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 3);
        assert_eq!(transactions[1]["date"], "2024-01-07");
        assert!(transactions[1]["description"].is_null());
        assert!(transactions[1]["category"].is_null());

        let (status, body) = get_json(app.clone(), "/customers").await;
        assert_eq!(status, StatusCode::OK);
        let customers = body["customers"].as_array().unwrap();
        assert_eq!(customers.len(), 3);
        assert!(customers.iter().any(Value::is_null));

        let (status, body) = get_json(app, "/months").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["months"], json!(["2024-02", "2024-01", null]));
    }

    #[tokio::test]
    async fn test_missing_store_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(AppState::new(Config::with_db_path(
            dir.path().join("missing.db"),
        )));

        let (status, body) = get_json(app, "/customers").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], 500);
        assert!(body["error"].as_str().unwrap().starts_with("Database error"));
    }

    #[tokio::test]
    async fn test_malformed_schema_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banko.db");
        Connection::open(&path)
            .unwrap()
            .execute("CREATE TABLE unrelated (x INTEGER)", [])
            .unwrap();

        let app = build_router(AppState::new(Config::with_db_path(path)));
        let (status, _) = get_json(app, "/months").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
