use super::common::{created, ok, paginated, ListQuery};
use crate::{
    entities::vendor,
    errors::ServiceError,
    middleware_helpers::TenantContext,
    services::vendors::{CreateVendorRequest, UpdateVendorRequest},
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
    path = "/api/v1/vendors",
    tag = "vendors",
    params(ListQuery),
    responses(
        (status = 200, description = "Vendors, newest first", body = ApiResponse<PaginatedResponse<vendor::Model>>),
    )
)]
pub async fn list_vendors(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<vendor::Model>> {
    let params = query.to_params(&state.config)?;
    let page = state.services.vendors.list(tenant.tenant_id, &params).await?;
    Ok(ok(paginated(page, &params)))
}

#[utoipa::path(
    post,
    path = "/api/v1/vendors",
    tag = "vendors",
    request_body = CreateVendorRequest,
    responses(
        (status = 201, description = "Vendor created", body = ApiResponse<vendor::Model>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_vendor(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(input): Json<CreateVendorRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let vendor = state.services.vendors.create(tenant.tenant_id, input).await?;
    Ok(created(vendor))
}

#[utoipa::path(
    get,
    path = "/api/v1/vendors/{id}",
    tag = "vendors",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Vendor", body = ApiResponse<vendor::Model>),
        (status = 404, description = "Not found in this tenant", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_vendor(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<vendor::Model> {
    Ok(ok(state.services.vendors.get(tenant.tenant_id, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/vendors/{id}",
    tag = "vendors",
    params(("id" = Uuid, Path, description = "Vendor id")),
    request_body = UpdateVendorRequest,
    responses(
        (status = 200, description = "Vendor updated", body = ApiResponse<vendor::Model>),
        (status = 404, description = "Not found in this tenant", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_vendor(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateVendorRequest>,
) -> ApiResult<vendor::Model> {
    Ok(ok(state
        .services
        .vendors
        .update(tenant.tenant_id, id, input)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/vendors/{id}",
    tag = "vendors",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 204, description = "Vendor deleted"),
        (status = 409, description = "Purchase orders still reference the vendor", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_vendor(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.vendors.delete(tenant.tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vendors).post(create_vendor))
        .route(
            "/:id",
            get(get_vendor).put(update_vendor).delete(delete_vendor),
        )
}
