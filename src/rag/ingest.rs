use super::{
    chunker::{chunk_text, sha256_hex, Chunk},
    embedding::EmbeddingProvider,
};
use crate::{
    config::RagConfig,
    db::DbPool,
    entities::{rag_chunk, rag_document},
    errors::ServiceError,
    metrics::{increment_counter_by, RAG_CHUNKS_INGESTED_TOTAL},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Serialize;
use std::{path::Path, sync::Arc};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use walkdir::WalkDir;

const CHUNK_INSERT_BATCH: usize = 100;

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub extensions: Vec<String>,
    pub max_file_bytes: u64,
    pub batch_size: usize,
}

impl From<&RagConfig> for IngestOptions {
    fn from(config: &RagConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            extensions: config.extension_list(),
            max_file_bytes: config.max_file_bytes,
            batch_size: config.embedding_batch_size.max(1),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngestFileError {
    pub path: String,
    pub message: String,
}

/// Outcome of one ingestion run
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct IngestReport {
    pub files_seen: usize,
    pub files_ingested: usize,
    pub files_unchanged: usize,
    pub files_skipped: usize,
    pub chunks_written: usize,
    pub errors: Vec<IngestFileError>,
}

enum FileOutcome {
    Ingested(usize),
    Unchanged,
}

/// Walks a directory tree and stores chunked, optionally embedded, text
/// files for one tenant.
pub struct Ingestor {
    db: Arc<DbPool>,
    embedder: Arc<dyn EmbeddingProvider>,
    options: IngestOptions,
}

impl Ingestor {
    pub fn new(
        db: Arc<DbPool>,
        embedder: Arc<dyn EmbeddingProvider>,
        options: IngestOptions,
    ) -> Result<Self, ServiceError> {
        // Reject bad chunk geometry before touching any file
        chunk_text("", options.chunk_size, options.chunk_overlap)?;
        Ok(Self {
            db,
            embedder,
            options,
        })
    }

    fn wants_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.options.extensions.iter().any(|allowed| *allowed == ext)
            })
            .unwrap_or(false)
    }

    /// Ingests every matching file under `root` (or `root` itself when it is
    /// a file). Per-file failures are collected in the report.
    #[instrument(skip(self), fields(provider = self.embedder.kind()))]
    pub async fn ingest_path(
        &self,
        tenant_id: Uuid,
        root: &Path,
    ) -> Result<IngestReport, ServiceError> {
        let root = root.canonicalize().map_err(|e| {
            ServiceError::BadRequest(format!("cannot read {}: {}", root.display(), e))
        })?;

        let mut report = IngestReport::default();

        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string());
                    report.errors.push(IngestFileError {
                        path,
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            report.files_seen += 1;
            let path = entry.path();

            if !self.wants_extension(path) {
                report.files_skipped += 1;
                continue;
            }
            let size = entry.metadata().map(|m| m.len()).unwrap_or(u64::MAX);
            if size > self.options.max_file_bytes {
                debug!(path = %path.display(), size, "skipping oversized file");
                report.files_skipped += 1;
                continue;
            }

            match self.ingest_file(tenant_id, path).await {
                Ok(FileOutcome::Ingested(chunks)) => {
                    report.files_ingested += 1;
                    report.chunks_written += chunks;
                }
                Ok(FileOutcome::Unchanged) => report.files_unchanged += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to ingest file");
                    report.errors.push(IngestFileError {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        increment_counter_by(RAG_CHUNKS_INGESTED_TOTAL, report.chunks_written as u64);
        info!(
            files_seen = report.files_seen,
            files_ingested = report.files_ingested,
            files_unchanged = report.files_unchanged,
            chunks_written = report.chunks_written,
            errors = report.errors.len(),
            "ingestion finished"
        );
        Ok(report)
    }

    async fn ingest_file(&self, tenant_id: Uuid, path: &Path) -> Result<FileOutcome, ServiceError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ServiceError::BadRequest(format!("read failed: {}", e)))?;
        let content_hash = sha256_hex(&bytes);
        let text = String::from_utf8(bytes)
            .map_err(|_| ServiceError::BadRequest("file is not valid UTF-8".into()))?;
        let path_key = path.display().to_string();

        let existing = rag_document::Entity::find()
            .filter(rag_document::Column::TenantId.eq(tenant_id))
            .filter(rag_document::Column::Path.eq(path_key.as_str()))
            .one(&*self.db)
            .await?;

        // Same bytes are only skipped when no embeddings are missing
        if let Some(doc) = &existing {
            if doc.content_hash == content_hash && (doc.embedded || !self.embedder.is_enabled()) {
                return Ok(FileOutcome::Unchanged);
            }
        }

        let chunks = chunk_text(&text, self.options.chunk_size, self.options.chunk_overlap)?;
        let embeddings = self.embed_chunks(&chunks).await?;
        let now = Utc::now();

        let txn = self.db.begin().await?;

        let document_id = match existing {
            Some(doc) => {
                rag_chunk::Entity::delete_many()
                    .filter(rag_chunk::Column::DocumentId.eq(doc.id))
                    .exec(&txn)
                    .await?;
                let id = doc.id;
                let mut model: rag_document::ActiveModel = doc.into();
                model.content_hash = Set(content_hash);
                model.byte_len = Set(text.len() as i64);
                model.chunk_count = Set(chunks.len() as i32);
                model.embedded = Set(embeddings.is_some());
                model.ingested_at = Set(now);
                model.update(&txn).await?;
                id
            }
            None => {
                let id = Uuid::new_v4();
                rag_document::ActiveModel {
                    id: Set(id),
                    tenant_id: Set(tenant_id),
                    path: Set(path_key),
                    content_hash: Set(content_hash),
                    byte_len: Set(text.len() as i64),
                    chunk_count: Set(chunks.len() as i32),
                    embedded: Set(embeddings.is_some()),
                    ingested_at: Set(now),
                    created_at: Set(now),
                    updated_at: Set(None),
                }
                .insert(&txn)
                .await?;
                id
            }
        };

        let rows: Vec<rag_chunk::ActiveModel> = chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| rag_chunk::ActiveModel {
                id: Set(Uuid::new_v4()),
                tenant_id: Set(tenant_id),
                document_id: Set(document_id),
                chunk_index: Set(chunk.index as i32),
                start_char: Set(chunk.start_char as i64),
                end_char: Set(chunk.end_char as i64),
                content: Set(chunk.content.clone()),
                content_hash: Set(chunk.hash.clone()),
                embedding: Set(embeddings
                    .as_ref()
                    .and_then(|vectors| vectors.get(i))
                    .map(|vector| serde_json::json!(vector))),
                created_at: Set(now),
            })
            .collect();

        let written = rows.len();
        let mut rows = rows.into_iter().peekable();
        while rows.peek().is_some() {
            let batch: Vec<_> = rows.by_ref().take(CHUNK_INSERT_BATCH).collect();
            rag_chunk::Entity::insert_many(batch).exec(&txn).await?;
        }

        txn.commit().await?;
        debug!(path = %path.display(), chunks = written, "document stored");
        Ok(FileOutcome::Ingested(written))
    }

    /// `None` when the provider is disabled
    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Option<Vec<Vec<f32>>>, ServiceError> {
        if !self.embedder.is_enabled() {
            return Ok(None);
        }

        let mut vectors = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.options.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            vectors.extend(self.embedder.embed(&texts).await?);
        }
        Ok(Some(vectors))
    }
}
