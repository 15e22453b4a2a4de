use super::common::ok;
use crate::{
    middleware_helpers::TenantContext, services::revenue::RevenueMetrics, ApiResponse, ApiResult,
    AppState,
};
use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RevenueQuery {
    /// Earliest invoice issue date, RFC 3339
    pub from: Option<DateTime<Utc>>,
    /// Latest invoice issue date, RFC 3339
    pub to: Option<DateTime<Utc>>,
}

#[utoipa::path(
    get,
    path = "/api/v1/revenue/metrics",
    tag = "revenue",
    params(RevenueQuery),
    responses(
        (status = 200, description = "Billing, collection and pipeline figures", body = ApiResponse<RevenueMetrics>),
        (status = 400, description = "'from' after 'to' or malformed dates", body = crate::errors::ErrorResponse),
    )
)]
pub async fn revenue_metrics(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<RevenueQuery>,
) -> ApiResult<RevenueMetrics> {
    let metrics = state
        .services
        .revenue
        .metrics(tenant.tenant_id, query.from, query.to)
        .await?;
    Ok(ok(metrics))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/metrics", get(revenue_metrics))
}
