use super::common::{ok, paginated, ListQuery};
use crate::{
    entities::rag_document,
    middleware_helpers::TenantContext,
    rag::{SearchRequest, SearchResponse},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};

#[utoipa::path(
    post,
    path = "/api/v1/rag/search",
    tag = "rag",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Chunks ranked by cosine similarity", body = ApiResponse<SearchResponse>),
        (status = 400, description = "Blank query or top_k outside 1..=50", body = crate::errors::ErrorResponse),
        (status = 503, description = "No embedding provider configured", body = crate::errors::ErrorResponse),
    )
)]
pub async fn search(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(request): Json<SearchRequest>,
) -> ApiResult<SearchResponse> {
    Ok(ok(state.services.rag.search(tenant.tenant_id, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/rag/documents",
    tag = "rag",
    params(ListQuery),
    responses(
        (status = 200, description = "Ingested documents, most recent first", body = ApiResponse<PaginatedResponse<rag_document::Model>>),
    )
)]
pub async fn list_documents(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<rag_document::Model>> {
    let params = query.to_params(&state.config)?;
    let page = state
        .services
        .rag
        .list_documents(tenant.tenant_id, &params)
        .await?;
    Ok(ok(paginated(page, &params)))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/search", post(search))
        .route("/documents", get(list_documents))
}
