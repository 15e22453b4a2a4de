/*!
 * # Health Check Module
 *
 * - `/health` and `/api/v1/health`: full report with a database ping
 * - `/health/live`: process is up, no dependencies checked
 * - `/health/ready`: the database answers
 */

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct CheckResult {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct HealthChecks {
    pub database: CheckResult,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub environment: String,
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

impl HealthReport {
    pub fn status_code(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

async fn check_database(state: &AppState) -> CheckResult {
    match crate::db::check_connection(&state.db).await {
        Ok(latency) => CheckResult {
            status: HealthStatus::Healthy,
            latency_ms: Some(latency.as_millis() as u64),
            message: None,
        },
        Err(e) => CheckResult {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            message: Some(e.to_string()),
        },
    }
}

pub async fn build_report(state: &AppState) -> HealthReport {
    let database = check_database(state).await;
    HealthReport {
        status: database.status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_seconds: state.uptime().as_secs(),
        checks: HealthChecks { database },
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service and database healthy", body = HealthReport),
        (status = 503, description = "Database unreachable", body = HealthReport),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = build_report(&state).await;
    if report.status == HealthStatus::Unhealthy {
        tracing::warn!(
            message = report.checks.database.message.as_deref().unwrap_or_default(),
            "health check failed"
        );
    }
    (report.status_code(), Json(report))
}

#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness() -> Json<Value> {
    Json(json!({ "status": "alive" }))
}

#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Ready to serve traffic"),
        (status = 503, description = "Database unreachable"),
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database = check_database(&state).await;
    match database.status {
        HealthStatus::Healthy => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        HealthStatus::Unhealthy => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready", "database": database })),
        ),
    }
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
}
