use super::common::{created, ok, paginated, ListQuery};
use crate::{
    entities::job,
    errors::ServiceError,
    middleware_helpers::TenantContext,
    services::jobs::{CreateJobRequest, UpdateJobRequest, UpdateJobStatusRequest},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    tag = "jobs",
    params(ListQuery),
    responses(
        (status = 200, description = "Jobs, newest first", body = ApiResponse<PaginatedResponse<job::Model>>),
        (status = 400, description = "Unknown status filter", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_jobs(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<job::Model>> {
    let params = query.to_params(&state.config)?;
    let page = state
        .services
        .jobs
        .list(tenant.tenant_id, &params, query.customer_id)
        .await?;
    Ok(ok(paginated(page, &params)))
}

#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    tag = "jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Job created in pending status", body = ApiResponse<job::Model>),
        (status = 400, description = "Validation failed or unknown customer", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_job(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(input): Json<CreateJobRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state.services.jobs.create(tenant.tenant_id, input).await?;
    Ok(created(job))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    tag = "jobs",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job", body = ApiResponse<job::Model>),
        (status = 404, description = "Not found in this tenant", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_job(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<job::Model> {
    Ok(ok(state.services.jobs.get(tenant.tenant_id, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/jobs/{id}",
    tag = "jobs",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Job updated", body = ApiResponse<job::Model>),
        (status = 404, description = "Not found in this tenant", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_job(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateJobRequest>,
) -> ApiResult<job::Model> {
    Ok(ok(state
        .services
        .jobs
        .update(tenant.tenant_id, id, input)
        .await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/jobs/{id}/status",
    tag = "jobs",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = UpdateJobStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<job::Model>),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_job_status(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateJobStatusRequest>,
) -> ApiResult<job::Model> {
    Ok(ok(state
        .services
        .jobs
        .update_status(tenant.tenant_id, id, input.status)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}",
    tag = "jobs",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 204, description = "Job deleted"),
        (status = 409, description = "Only pending or cancelled jobs can be deleted", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_job(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.jobs.delete(tenant.tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_jobs).post(create_job))
        .route("/:id", get(get_job).put(update_job).delete(delete_job))
        .route("/:id/status", put(update_job_status))
}
