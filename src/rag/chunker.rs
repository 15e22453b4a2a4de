//! Fixed-window character chunker.
//!
//! Text is split into windows of `chunk_size` characters. A new window starts
//! every `chunk_size - overlap` characters, so neighbouring chunks share
//! `overlap` characters of context. Offsets are character offsets, never byte
//! offsets, so a window can not end inside a multi-byte code point.

use crate::errors::ServiceError;
use sha2::{Digest, Sha256};

/// One window of a source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    /// Inclusive start, in characters
    pub start_char: usize,
    /// Exclusive end, in characters
    pub end_char: usize,
    pub content: String,
    /// Hex SHA-256 of `content`
    pub hash: String,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Splits `text` into overlapping character windows.
///
/// Windows holding only whitespace are dropped without consuming an index.
/// The walk stops after the first window that reaches the end of the text.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>, ServiceError> {
    if chunk_size == 0 {
        return Err(ServiceError::ValidationError(
            "chunk_size must be greater than zero".into(),
        ));
    }
    if overlap >= chunk_size {
        return Err(ServiceError::ValidationError(format!(
            "overlap ({}) must be smaller than chunk_size ({})",
            overlap, chunk_size
        )));
    }

    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let content: String = chars[start..end].iter().collect();

        if !content.trim().is_empty() {
            chunks.push(Chunk {
                index: chunks.len(),
                start_char: start,
                end_char: end,
                hash: sha256_hex(content.as_bytes()),
                content,
            });
        }

        if end == chars.len() {
            break;
        }
        start += step;
    }

    Ok(chunks)
}
