use super::common::{created, ok, paginated, ListQuery};
use crate::{
    entities::{invoice, payment},
    errors::ServiceError,
    middleware_helpers::TenantContext,
    services::invoices::{CreateInvoiceRequest, RecordPaymentRequest, UpdateInvoiceRequest},
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
    path = "/api/v1/invoices",
    tag = "invoices",
    params(ListQuery),
    responses(
        (status = 200, description = "Invoices, newest first", body = ApiResponse<PaginatedResponse<invoice::Model>>),
        (status = 400, description = "Unknown status filter", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<invoice::Model>> {
    let params = query.to_params(&state.config)?;
    let page = state
        .services
        .invoices
        .list(tenant.tenant_id, &params, query.customer_id)
        .await?;
    Ok(ok(paginated(page, &params)))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices",
    tag = "invoices",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Draft invoice with computed totals", body = ApiResponse<invoice::Model>),
        (status = 400, description = "Invalid line items or unknown customer", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(input): Json<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let invoice = state
        .services
        .invoices
        .create(tenant.tenant_id, input)
        .await?;
    Ok(created(invoice))
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices/{id}",
    tag = "invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice", body = ApiResponse<invoice::Model>),
        (status = 404, description = "Not found in this tenant", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<invoice::Model> {
    Ok(ok(state.services.invoices.get(tenant.tenant_id, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/invoices/{id}",
    tag = "invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = UpdateInvoiceRequest,
    responses(
        (status = 200, description = "Invoice updated", body = ApiResponse<invoice::Model>),
        (status = 409, description = "Invoice is no longer a draft", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_invoice(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateInvoiceRequest>,
) -> ApiResult<invoice::Model> {
    Ok(ok(state
        .services
        .invoices
        .update(tenant.tenant_id, id, input)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/invoices/{id}",
    tag = "invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 204, description = "Invoice deleted"),
        (status = 409, description = "Invoice is no longer a draft", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_invoice(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.invoices.delete(tenant.tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/send",
    tag = "invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice sent", body = ApiResponse<invoice::Model>),
        (status = 409, description = "Invoice is not a draft", body = crate::errors::ErrorResponse),
    )
)]
pub async fn send_invoice(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<invoice::Model> {
    Ok(ok(state.services.invoices.send(tenant.tenant_id, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/payments",
    tag = "invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = RecordPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded; returns the updated invoice", body = ApiResponse<invoice::Model>),
        (status = 400, description = "Non-positive amount or amount above balance", body = crate::errors::ErrorResponse),
        (status = 409, description = "Invoice is draft or void", body = crate::errors::ErrorResponse),
    )
)]
pub async fn record_payment(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<RecordPaymentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let invoice = state
        .services
        .invoices
        .record_payment(tenant.tenant_id, id, input)
        .await?;
    Ok(created(invoice))
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices/{id}/payments",
    tag = "invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Payments in the order received", body = ApiResponse<Vec<payment::Model>>),
        (status = 404, description = "Not found in this tenant", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_payments(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<payment::Model>> {
    Ok(ok(state
        .services
        .invoices
        .list_payments(tenant.tenant_id, id)
        .await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/void",
    tag = "invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice voided", body = ApiResponse<invoice::Model>),
        (status = 409, description = "Already void or has payments", body = crate::errors::ErrorResponse),
    )
)]
pub async fn void_invoice(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<invoice::Model> {
    Ok(ok(state.services.invoices.void(tenant.tenant_id, id).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route(
            "/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/:id/send", post(send_invoice))
        .route("/:id/payments", get(list_payments).post(record_payment))
        .route("/:id/void", post(void_invoice))
}
