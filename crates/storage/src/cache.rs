//! Disk cache: digest resolution and completion checks.

use crate::chunked::{ChunkWriter, WriterOptions};
use crate::error::{StorageError, StorageResult};
use crate::layout::{self, PathResolver};
use blobcache_core::{CacheConfig, Digest};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// A directory of blob files addressed by digest.
pub struct DiskCache {
    root: PathBuf,
    resolver: Box<dyn PathResolver>,
    options: WriterOptions,
}

impl DiskCache {
    /// Open the cache described by `config`, creating its root directory.
    #[instrument(skip(config), fields(root = %config.root.display()))]
    pub fn open(config: &CacheConfig) -> StorageResult<Self> {
        config.validate().map_err(StorageError::Config)?;
        fs::create_dir_all(&config.root)?;
        Ok(Self {
            root: config.root.clone(),
            resolver: layout::from_config(config.layout),
            options: WriterOptions::from(config),
        })
    }

    /// Build a cache with a custom path resolver.
    ///
    /// The root is not created; parent directories of each blob are created
    /// on demand by [`open_for_write`](Self::open_for_write).
    pub fn with_resolver(
        root: impl Into<PathBuf>,
        resolver: impl PathResolver + 'static,
        options: WriterOptions,
    ) -> Self {
        Self {
            root: root.into(),
            resolver: Box::new(resolver),
            options,
        }
    }

    /// Root directory of the cache.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for `digest`.
    pub fn path_for(&self, digest: &Digest) -> PathBuf {
        self.resolver.path_for(&self.root, digest)
    }

    /// Current on-disk length of the blob, if its file exists.
    pub fn stat(&self, digest: &Digest) -> StorageResult<Option<u64>> {
        Ok(layout::probe_len(&self.path_for(digest))?)
    }

    /// Whether the blob is on disk at exactly `size` bytes.
    ///
    /// Only the length is compared; contents are not re-hashed.
    pub fn is_complete(&self, digest: &Digest, size: u64) -> StorageResult<bool> {
        Ok(self.stat(digest)? == Some(size))
    }

    /// Start a chunked write of the blob `digest` of `size` bytes.
    ///
    /// If the blob is already complete the returned session is pass-through.
    /// Otherwise the file is created if missing and opened without
    /// truncation, so ranges written by an earlier, interrupted attempt stay
    /// in place.
    ///
    /// The completeness check and the open are not atomic; callers writing
    /// the same digest from several places must serialize this call.
    #[instrument(skip(self, digest), fields(digest = %digest))]
    pub fn open_for_write(&self, digest: Digest, size: u64) -> StorageResult<ChunkWriter> {
        let path = self.path_for(&digest);

        if layout::probe_len(&path)? == Some(size) {
            debug!(path = %path.display(), "blob already complete");
            return Ok(ChunkWriter::complete(path));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        debug!(path = %path.display(), "blob opened for chunked writes");
        Ok(ChunkWriter::active(path, file, digest, size, self.options))
    }
}

impl std::fmt::Debug for DiskCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskCache")
            .field("root", &self.root)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
