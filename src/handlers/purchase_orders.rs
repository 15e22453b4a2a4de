use super::common::{created, ok, paginated, ListQuery};
use crate::{
    entities::purchase_order,
    errors::ServiceError,
    middleware_helpers::TenantContext,
    services::purchase_orders::{CreatePurchaseOrderRequest, UpdatePurchaseOrderRequest},
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
    path = "/api/v1/purchase-orders",
    tag = "purchase_orders",
    params(ListQuery),
    responses(
        (status = 200, description = "Purchase orders, newest first", body = ApiResponse<PaginatedResponse<purchase_order::Model>>),
        (status = 400, description = "Unknown status filter", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<purchase_order::Model>> {
    let params = query.to_params(&state.config)?;
    let page = state
        .services
        .purchase_orders
        .list(tenant.tenant_id, &params, query.vendor_id)
        .await?;
    Ok(ok(paginated(page, &params)))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    tag = "purchase_orders",
    request_body = CreatePurchaseOrderRequest,
    responses(
        (status = 201, description = "Draft purchase order", body = ApiResponse<purchase_order::Model>),
        (status = 400, description = "Unknown vendor or inventory item", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(input): Json<CreatePurchaseOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .purchase_orders
        .create(tenant.tenant_id, input)
        .await?;
    Ok(created(order))
}

#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}",
    tag = "purchase_orders",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "Purchase order", body = ApiResponse<purchase_order::Model>),
        (status = 404, description = "Not found in this tenant", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<purchase_order::Model> {
    Ok(ok(state
        .services
        .purchase_orders
        .get(tenant.tenant_id, id)
        .await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders/{id}",
    tag = "purchase_orders",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    request_body = UpdatePurchaseOrderRequest,
    responses(
        (status = 200, description = "Purchase order updated", body = ApiResponse<purchase_order::Model>),
        (status = 409, description = "Purchase order is no longer a draft", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_purchase_order(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePurchaseOrderRequest>,
) -> ApiResult<purchase_order::Model> {
    Ok(ok(state
        .services
        .purchase_orders
        .update(tenant.tenant_id, id, input)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/purchase-orders/{id}",
    tag = "purchase_orders",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses(
        (status = 204, description = "Purchase order deleted"),
        (status = 409, description = "Purchase order is no longer a draft", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .purchase_orders
        .delete(tenant.tenant_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/submit",
    tag = "purchase_orders",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "Submitted to the vendor", body = ApiResponse<purchase_order::Model>),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn submit_purchase_order(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<purchase_order::Model> {
    Ok(ok(state
        .services
        .purchase_orders
        .submit(tenant.tenant_id, id)
        .await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/receive",
    tag = "purchase_orders",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "Received; stock of referenced items increased", body = ApiResponse<purchase_order::Model>),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn receive_purchase_order(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<purchase_order::Model> {
    Ok(ok(state
        .services
        .purchase_orders
        .receive(tenant.tenant_id, id)
        .await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/cancel",
    tag = "purchase_orders",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "Cancelled", body = ApiResponse<purchase_order::Model>),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn cancel_purchase_order(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<purchase_order::Model> {
    Ok(ok(state
        .services
        .purchase_orders
        .cancel(tenant.tenant_id, id)
        .await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_purchase_orders).post(create_purchase_order))
        .route(
            "/:id",
            get(get_purchase_order)
                .put(update_purchase_order)
                .delete(delete_purchase_order),
        )
        .route("/:id/submit", post(submit_purchase_order))
        .route("/:id/receive", post(receive_purchase_order))
        .route("/:id/cancel", post(cancel_purchase_order))
}
