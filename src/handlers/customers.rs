use super::common::{created, ok, paginated, ListQuery};
use crate::{
    entities::{customer, job},
    errors::ServiceError,
    middleware_helpers::TenantContext,
    services::customers::{CreateCustomerRequest, UpdateCustomerRequest},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/customers",
    tag = "customers",
    params(ListQuery, ("x-tenant-id" = Option<String>, Header, description = "Tenant UUID")),
    responses(
        (status = 200, description = "Customers, newest first", body = ApiResponse<PaginatedResponse<customer::Model>>),
        (status = 400, description = "Bad tenant header or status filter", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_customers(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<customer::Model>> {
    let params = query.to_params(&state.config)?;
    let page = state
        .services
        .customers
        .list(tenant.tenant_id, &params)
        .await?;
    Ok(ok(paginated(page, &params)))
}

#[utoipa::path(
    post,
    path = "/api/v1/customers",
    tag = "customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = ApiResponse<customer::Model>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_customer(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(input): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = state
        .services
        .customers
        .create(tenant.tenant_id, input)
        .await?;
    Ok(created(customer))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    tag = "customers",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer", body = ApiResponse<customer::Model>),
        (status = 404, description = "Not found in this tenant", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_customer(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<customer::Model> {
    let customer = state.services.customers.get(tenant.tenant_id, id).await?;
    Ok(ok(customer))
}

#[utoipa::path(
    put,
    path = "/api/v1/customers/{id}",
    tag = "customers",
    params(("id" = Uuid, Path, description = "Customer id")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = ApiResponse<customer::Model>),
        (status = 404, description = "Not found in this tenant", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_customer(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCustomerRequest>,
) -> ApiResult<customer::Model> {
    let customer = state
        .services
        .customers
        .update(tenant.tenant_id, id, input)
        .await?;
    Ok(ok(customer))
}

#[utoipa::path(
    delete,
    path = "/api/v1/customers/{id}",
    tag = "customers",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 409, description = "Customer still has jobs, estimates or invoices", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.customers.delete(tenant.tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}/jobs",
    tag = "customers",
    params(("id" = Uuid, Path, description = "Customer id"), ListQuery),
    responses(
        (status = 200, description = "Jobs of the customer", body = ApiResponse<PaginatedResponse<job::Model>>),
        (status = 404, description = "Not found in this tenant", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_customer_jobs(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<job::Model>> {
    let params = query.to_params(&state.config)?;
    let page = state
        .services
        .customers
        .list_jobs(tenant.tenant_id, id, &params)
        .await?;
    Ok(ok(paginated(page, &params)))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/:id/jobs", get(list_customer_jobs))
}
