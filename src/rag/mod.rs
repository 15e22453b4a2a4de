//! Retrieval support: character chunking, embedding providers, directory
//! ingestion and cosine-similarity search over stored chunks.

pub mod chunker;
pub mod embedding;
pub mod ingest;
pub mod search;

pub use chunker::{chunk_text, Chunk};
pub use embedding::{create_provider, cosine_similarity, EmbeddingProvider};
pub use ingest::{IngestOptions, IngestReport, Ingestor};
pub use search::{RagService, SearchHit, SearchRequest, SearchResponse};
