use super::common::{created, ok, paginated, ListQuery};
use crate::{
    entities::inventory_item,
    errors::ServiceError,
    middleware_helpers::TenantContext,
    services::inventory::{AdjustStockRequest, CreateInventoryItemRequest, UpdateInventoryItemRequest},
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
    path = "/api/v1/inventory",
    tag = "inventory",
    params(ListQuery),
    responses(
        (status = 200, description = "Inventory items, newest first", body = ApiResponse<PaginatedResponse<inventory_item::Model>>),
    )
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<inventory_item::Model>> {
    let params = query.to_params(&state.config)?;
    let page = state
        .services
        .inventory
        .list(tenant.tenant_id, &params)
        .await?;
    Ok(ok(paginated(page, &params)))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/low-stock",
    tag = "inventory",
    responses(
        (status = 200, description = "Items at or below their reorder point", body = ApiResponse<Vec<inventory_item::Model>>),
    )
)]
pub async fn low_stock(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> ApiResult<Vec<inventory_item::Model>> {
    Ok(ok(state.services.inventory.low_stock(tenant.tenant_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory",
    tag = "inventory",
    request_body = CreateInventoryItemRequest,
    responses(
        (status = 201, description = "Item created", body = ApiResponse<inventory_item::Model>),
        (status = 409, description = "SKU already used in this tenant", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(input): Json<CreateInventoryItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state
        .services
        .inventory
        .create(tenant.tenant_id, input)
        .await?;
    Ok(created(item))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/{id}",
    tag = "inventory",
    params(("id" = Uuid, Path, description = "Inventory item id")),
    responses(
        (status = 200, description = "Inventory item", body = ApiResponse<inventory_item::Model>),
        (status = 404, description = "Not found in this tenant", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<inventory_item::Model> {
    Ok(ok(state.services.inventory.get(tenant.tenant_id, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/inventory/{id}",
    tag = "inventory",
    params(("id" = Uuid, Path, description = "Inventory item id")),
    request_body = UpdateInventoryItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<inventory_item::Model>),
        (status = 409, description = "SKU already used in this tenant", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateInventoryItemRequest>,
) -> ApiResult<inventory_item::Model> {
    Ok(ok(state
        .services
        .inventory
        .update(tenant.tenant_id, id, input)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/inventory/{id}",
    tag = "inventory",
    params(("id" = Uuid, Path, description = "Inventory item id")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Not found in this tenant", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.inventory.delete(tenant.tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory/{id}/adjust",
    tag = "inventory",
    params(("id" = Uuid, Path, description = "Inventory item id")),
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Quantity adjusted", body = ApiResponse<inventory_item::Model>),
        (status = 400, description = "Zero delta or stock would go negative", body = crate::errors::ErrorResponse),
    )
)]
pub async fn adjust_item(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<AdjustStockRequest>,
) -> ApiResult<inventory_item::Model> {
    Ok(ok(state
        .services
        .inventory
        .adjust(tenant.tenant_id, id, input)
        .await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory).post(create_item))
        .route("/low-stock", get(low_stock))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
        .route("/:id/adjust", post(adjust_item))
}
