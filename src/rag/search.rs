use super::embedding::{cosine_similarity, EmbeddingProvider};
use crate::{
    db::DbPool,
    entities::{rag_chunk, rag_document},
    errors::ServiceError,
    services::{contains_ci, ListParams, Page},
};
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_TOP_K: usize = 5;
pub const MAX_TOP_K: usize = 50;

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SearchRequest {
    #[validate(length(min = 1, max = 2000))]
    pub query: String,
    #[serde(default = "default_top_k")]
    #[validate(range(min = 1, max = 50))]
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchHit {
    pub document_id: Uuid,
    pub path: String,
    pub chunk_index: i32,
    pub start_char: i64,
    pub end_char: i64,
    pub content: String,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchResponse {
    pub query: String,
    pub model: String,
    pub hits: Vec<SearchHit>,
}

/// Similarity search over the tenant's embedded chunks
#[derive(Clone)]
pub struct RagService {
    db: Arc<DbPool>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl RagService {
    pub fn new(db: Arc<DbPool>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { db, embedder }
    }

    #[instrument(skip(self, request), fields(top_k = request.top_k))]
    pub async fn search(
        &self,
        tenant_id: Uuid,
        request: SearchRequest,
    ) -> Result<SearchResponse, ServiceError> {
        request.validate()?;
        let query = request.query.trim().to_string();
        if query.is_empty() {
            return Err(ServiceError::ValidationError("query must not be blank".into()));
        }
        if !self.embedder.is_enabled() {
            return Err(ServiceError::ServiceUnavailable(
                "search requires an embedding provider; set APP__RAG__EMBEDDING_PROVIDER".into(),
            ));
        }

        let query_vector = self
            .embedder
            .embed(std::slice::from_ref(&query))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ServiceError::ExternalServiceError("provider returned no query vector".into())
            })?;

        let chunks = rag_chunk::Entity::find()
            .filter(rag_chunk::Column::TenantId.eq(tenant_id))
            .filter(rag_chunk::Column::Embedding.is_not_null())
            .all(&*self.db)
            .await?;

        let mut scored: Vec<(f32, rag_chunk::Model)> = chunks
            .into_iter()
            .filter_map(|chunk| {
                // Vectors from another provider or width are not comparable
                let vector = chunk
                    .embedding_vector()
                    .filter(|vector| vector.len() == query_vector.len())?;
                Some((cosine_similarity(&query_vector, &vector), chunk))
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(request.top_k);

        let document_ids: Vec<Uuid> = scored.iter().map(|(_, c)| c.document_id).collect();
        let paths: HashMap<Uuid, String> = if document_ids.is_empty() {
            HashMap::new()
        } else {
            rag_document::Entity::find()
                .filter(rag_document::Column::TenantId.eq(tenant_id))
                .filter(rag_document::Column::Id.is_in(document_ids))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|doc| (doc.id, doc.path))
                .collect()
        };

        let hits = scored
            .into_iter()
            .map(|(score, chunk)| SearchHit {
                path: paths.get(&chunk.document_id).cloned().unwrap_or_default(),
                document_id: chunk.document_id,
                chunk_index: chunk.chunk_index,
                start_char: chunk.start_char,
                end_char: chunk.end_char,
                content: chunk.content,
                score,
            })
            .collect();

        Ok(SearchResponse {
            query,
            model: self.embedder.model_name().to_string(),
            hits,
        })
    }

    pub async fn list_documents(
        &self,
        tenant_id: Uuid,
        params: &ListParams,
    ) -> Result<Page<rag_document::Model>, ServiceError> {
        let mut query = rag_document::Entity::find()
            .filter(rag_document::Column::TenantId.eq(tenant_id));
        if let Some(term) = params.search_term() {
            query = query.filter(contains_ci(rag_document::Column::Path, term));
        }

        let total = query.clone().count(&*self.db).await?;
        let items = query
            .order_by_desc(rag_document::Column::IngestedAt)
            .offset(params.offset())
            .limit(params.limit)
            .all(&*self.db)
            .await?;

        Ok(Page { items, total })
    }
}
