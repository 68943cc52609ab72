//! Storage error types.

use blobcache_core::Digest;
use thiserror::Error;

/// Blob write errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File open/create/write failure, or an error from the input stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected end of input: expected {expected} bytes, got {received}")]
    UnexpectedEof { expected: u64, received: u64 },

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: Digest, actual: Digest },

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("chunk too large to buffer: {size} bytes (limit {limit})")]
    ChunkTooLarge { size: u64, limit: u64 },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
