//! Chunked, integrity-verified blob writer for the blobcache disk cache.
//!
//! This crate provides:
//! - Digest-to-path layouts for blob files
//! - A disk cache that detects already-complete blobs by size
//! - Writer sessions that fill a blob from independently verified chunks
//! - Positional writers that hash what they write

pub mod cache;
pub mod chunked;
pub mod error;
pub mod layout;
pub mod verify;

pub use cache::DiskCache;
pub use chunked::{ChunkWriter, WriterOptions};
pub use error::{StorageError, StorageResult};
pub use layout::{FlatLayout, PathResolver, ShardedLayout};
pub use verify::{OffsetWriter, VerifyingWriter};
