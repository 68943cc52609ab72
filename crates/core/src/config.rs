//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default in-memory limit for a single chunk in buffered mode: 64 MiB.
pub const DEFAULT_MAX_BUFFERED_CHUNK_BYTES: u64 = 64 * 1024 * 1024;

/// Disk cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Root directory of the cache.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// How digests map to file paths under the root.
    #[serde(default)]
    pub layout: LayoutConfig,
    /// How chunk bytes are verified relative to being written.
    #[serde(default)]
    pub write_mode: WriteMode,
    /// Largest chunk accepted in buffered mode, in bytes.
    #[serde(default = "default_max_buffered_chunk_bytes")]
    pub max_buffered_chunk_bytes: u64,
    /// Fsync the blob file when a writer session is closed (default: false).
    #[serde(default)]
    pub sync_on_close: bool,
}

/// On-disk layout of blob files.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LayoutConfig {
    /// `<root>/blobs/sha256-<hex>`.
    #[default]
    Flat,
    /// `<root>/blobs/sha256/<hex[0..2]>/<hex[2..4]>/<hex>`, for very large caches.
    Sharded,
}

/// Chunk verification strategy.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Stream bytes to disk while hashing; verify after the write.
    /// A mismatch leaves the range dirty until it is re-submitted.
    #[default]
    Direct,
    /// Read the whole chunk into memory and verify it before writing.
    /// The file never holds unverified bytes, at the cost of memory.
    Buffered,
}

fn default_root() -> PathBuf {
    PathBuf::from("./data/blobs")
}

fn default_max_buffered_chunk_bytes() -> u64 {
    DEFAULT_MAX_BUFFERED_CHUNK_BYTES
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            layout: LayoutConfig::default(),
            write_mode: WriteMode::default(),
            max_buffered_chunk_bytes: default_max_buffered_chunk_bytes(),
            sync_on_close: false,
        }
    }
}

impl CacheConfig {
    /// Create a test configuration rooted at `root`.
    ///
    /// **For testing only.**
    pub fn for_testing(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.root.as_os_str().is_empty() {
            return Err("cache.root cannot be empty".to_string());
        }

        if self.write_mode == WriteMode::Buffered && self.max_buffered_chunk_bytes == 0 {
            return Err(
                "cache.max_buffered_chunk_bytes cannot be 0 when write_mode = buffered"
                    .to_string(),
            );
        }

        Ok(())
    }
}
