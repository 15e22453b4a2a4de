use super::common::{created, ok, paginated, ListQuery};
use crate::{
    entities::{estimate, estimate::EstimateStatus, invoice},
    errors::ServiceError,
    middleware_helpers::TenantContext,
    services::estimates::{CreateEstimateRequest, UpdateEstimateRequest},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/estimates",
    tag = "estimates",
    params(ListQuery),
    responses(
        (status = 200, description = "Estimates, newest first", body = ApiResponse<PaginatedResponse<estimate::Model>>),
        (status = 400, description = "Unknown status filter", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_estimates(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<estimate::Model>> {
    let params = query.to_params(&state.config)?;
    let page = state
        .services
        .estimates
        .list(tenant.tenant_id, &params, query.customer_id)
        .await?;
    Ok(ok(paginated(page, &params)))
}

#[utoipa::path(
    post,
    path = "/api/v1/estimates",
    tag = "estimates",
    request_body = CreateEstimateRequest,
    responses(
        (status = 201, description = "Draft estimate with computed totals", body = ApiResponse<estimate::Model>),
        (status = 400, description = "Invalid line items or unknown customer", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_estimate(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(input): Json<CreateEstimateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let estimate = state
        .services
        .estimates
        .create(tenant.tenant_id, input)
        .await?;
    Ok(created(estimate))
}

#[utoipa::path(
    get,
    path = "/api/v1/estimates/{id}",
    tag = "estimates",
    params(("id" = Uuid, Path, description = "Estimate id")),
    responses(
        (status = 200, description = "Estimate", body = ApiResponse<estimate::Model>),
        (status = 404, description = "Not found in this tenant", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_estimate(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<estimate::Model> {
    Ok(ok(state.services.estimates.get(tenant.tenant_id, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/estimates/{id}",
    tag = "estimates",
    params(("id" = Uuid, Path, description = "Estimate id")),
    request_body = UpdateEstimateRequest,
    responses(
        (status = 200, description = "Estimate updated and totals recomputed", body = ApiResponse<estimate::Model>),
        (status = 409, description = "Estimate is no longer a draft", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_estimate(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateEstimateRequest>,
) -> ApiResult<estimate::Model> {
    Ok(ok(state
        .services
        .estimates
        .update(tenant.tenant_id, id, input)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/estimates/{id}",
    tag = "estimates",
    params(("id" = Uuid, Path, description = "Estimate id")),
    responses(
        (status = 204, description = "Estimate deleted"),
        (status = 409, description = "Estimate is no longer a draft", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_estimate(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.estimates.delete(tenant.tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn transition(
    state: &AppState,
    tenant: TenantContext,
    id: Uuid,
    next: EstimateStatus,
) -> ApiResult<estimate::Model> {
    Ok(ok(state
        .services
        .estimates
        .transition(tenant.tenant_id, id, next)
        .await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/estimates/{id}/send",
    tag = "estimates",
    params(("id" = Uuid, Path, description = "Estimate id")),
    responses(
        (status = 200, description = "Estimate sent", body = ApiResponse<estimate::Model>),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn send_estimate(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<estimate::Model> {
    transition(&state, tenant, id, EstimateStatus::Sent).await
}

#[utoipa::path(
    post,
    path = "/api/v1/estimates/{id}/accept",
    tag = "estimates",
    params(("id" = Uuid, Path, description = "Estimate id")),
    responses(
        (status = 200, description = "Estimate accepted", body = ApiResponse<estimate::Model>),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn accept_estimate(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<estimate::Model> {
    transition(&state, tenant, id, EstimateStatus::Accepted).await
}

#[utoipa::path(
    post,
    path = "/api/v1/estimates/{id}/reject",
    tag = "estimates",
    params(("id" = Uuid, Path, description = "Estimate id")),
    responses(
        (status = 200, description = "Estimate rejected", body = ApiResponse<estimate::Model>),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn reject_estimate(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<estimate::Model> {
    transition(&state, tenant, id, EstimateStatus::Rejected).await
}

#[utoipa::path(
    post,
    path = "/api/v1/estimates/{id}/expire",
    tag = "estimates",
    params(("id" = Uuid, Path, description = "Estimate id")),
    responses(
        (status = 200, description = "Estimate expired", body = ApiResponse<estimate::Model>),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn expire_estimate(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<estimate::Model> {
    transition(&state, tenant, id, EstimateStatus::Expired).await
}

#[utoipa::path(
    post,
    path = "/api/v1/estimates/{id}/convert",
    tag = "estimates",
    params(("id" = Uuid, Path, description = "Estimate id")),
    responses(
        (status = 201, description = "Draft invoice created from the estimate", body = ApiResponse<invoice::Model>),
        (status = 409, description = "Not accepted, or already converted", body = crate::errors::ErrorResponse),
    )
)]
pub async fn convert_estimate(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let invoice = state
        .services
        .estimates
        .convert_to_invoice(tenant.tenant_id, id)
        .await?;
    Ok(created(invoice))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_estimates).post(create_estimate))
        .route(
            "/:id",
            get(get_estimate)
                .put(update_estimate)
                .delete(delete_estimate),
        )
        .route("/:id/send", post(send_estimate))
        .route("/:id/accept", post(accept_estimate))
        .route("/:id/reject", post(reject_estimate))
        .route("/:id/expire", post(expire_estimate))
        .route("/:id/convert", post(convert_estimate))
}
