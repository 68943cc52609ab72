//! Core domain types for the blobcache disk cache.
//!
//! This crate defines the data model shared by the storage layer:
//! - Content digests and incremental hashing
//! - Inclusive chunk ranges within a blob
//! - Cache configuration

pub mod chunk;
pub mod config;
pub mod digest;
pub mod error;

pub use chunk::{ChunkRange, ChunkSplit};
pub use config::{CacheConfig, LayoutConfig, WriteMode};
pub use digest::{Digest, DigestHasher};
pub use error::{Error, Result};
