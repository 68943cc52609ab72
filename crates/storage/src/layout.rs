//! Digest-to-path mapping and the on-disk size probe.

use blobcache_core::config::LayoutConfig;
use blobcache_core::digest::{ALGORITHM, Digest};
use std::io;
use std::path::{Path, PathBuf};

/// Directory under the cache root holding blob files.
pub const BLOBS_DIR: &str = "blobs";

/// Maps a digest to the file that stores its blob.
///
/// Implementations must be deterministic: the same root and digest always
/// resolve to the same path.
pub trait PathResolver: Send + Sync {
    fn path_for(&self, root: &Path, digest: &Digest) -> PathBuf;
}

/// One directory of `sha256-<hex>` files.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatLayout;

impl PathResolver for FlatLayout {
    fn path_for(&self, root: &Path, digest: &Digest) -> PathBuf {
        root.join(BLOBS_DIR).join(digest.file_name())
    }
}

/// Two levels of two-hex-char fan-out, keeping directories small.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShardedLayout;

impl PathResolver for ShardedLayout {
    fn path_for(&self, root: &Path, digest: &Digest) -> PathBuf {
        let hex = digest.to_hex();
        root.join(BLOBS_DIR)
            .join(ALGORITHM)
            .join(&hex[..2])
            .join(&hex[2..4])
            .join(hex)
    }
}

/// Build the resolver selected by configuration.
pub fn from_config(layout: LayoutConfig) -> Box<dyn PathResolver> {
    match layout {
        LayoutConfig::Flat => Box::new(FlatLayout),
        LayoutConfig::Sharded => Box::new(ShardedLayout),
    }
}

/// Length of the regular file at `path`, or `None` if there is none.
///
/// Anything that is not a regular file (a directory, say) reports `None`;
/// opening it for writing later surfaces the real error.
pub fn probe_len(path: &Path) -> io::Result<Option<u64>> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
