//! Chunked writer sessions.
//!
//! A [`ChunkWriter`] fills one blob file from independently fetched,
//! independently verified byte ranges. Sessions over a blob that is already
//! complete are pass-through: every chunk is accepted without being read.

use crate::error::{StorageError, StorageResult};
use crate::verify::{OffsetWriter, VerifyingWriter};
use blobcache_core::config::{CacheConfig, WriteMode};
use blobcache_core::{ChunkRange, Digest};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace};

/// Per-session write behaviour, taken from [`CacheConfig`].
#[derive(Clone, Copy, Debug)]
pub struct WriterOptions {
    pub write_mode: WriteMode,
    pub max_buffered_chunk_bytes: u64,
    pub sync_on_close: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for WriterOptions {
    fn from(config: &CacheConfig) -> Self {
        Self {
            write_mode: config.write_mode,
            max_buffered_chunk_bytes: config.max_buffered_chunk_bytes,
            sync_on_close: config.sync_on_close,
        }
    }
}

/// Writes chunks of a single blob. Create one with
/// [`DiskCache::open_for_write`](crate::DiskCache::open_for_write).
///
/// `put` takes `&self`, so one session can be shared between threads that
/// write disjoint ranges. The file handle is released by [`close`](Self::close)
/// or when the session is dropped.
#[derive(Debug)]
pub struct ChunkWriter {
    path: PathBuf,
    session: Session,
}

#[derive(Debug)]
enum Session {
    /// The blob was already on disk at its declared size.
    Complete,
    Active(ActiveSession),
}

#[derive(Debug)]
struct ActiveSession {
    file: File,
    digest: Digest,
    size: u64,
    options: WriterOptions,
}

impl ChunkWriter {
    pub(crate) fn complete(path: PathBuf) -> Self {
        Self {
            path,
            session: Session::Complete,
        }
    }

    pub(crate) fn active(
        path: PathBuf,
        file: File,
        digest: Digest,
        size: u64,
        options: WriterOptions,
    ) -> Self {
        Self {
            path,
            session: Session::Active(ActiveSession {
                file,
                digest,
                size,
                options,
            }),
        }
    }

    /// Whether this session is pass-through.
    pub fn is_complete(&self) -> bool {
        matches!(self.session, Session::Complete)
    }

    /// Digest of the blob being written; `None` when pass-through.
    pub fn digest(&self) -> Option<&Digest> {
        match &self.session {
            Session::Complete => None,
            Session::Active(active) => Some(&active.digest),
        }
    }

    /// Declared size of the blob being written; `None` when pass-through.
    pub fn declared_size(&self) -> Option<u64> {
        match &self.session {
            Session::Complete => None,
            Session::Active(active) => Some(active.size),
        }
    }

    /// Path of the blob file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `chunk` from `reader`, verifying it against `expected`.
    ///
    /// Exactly `chunk.size()` bytes are read. `expected` is the digest of the
    /// chunk's bytes, not of the whole blob. The chunk must not overlap any
    /// chunk previously put into this blob.
    ///
    /// In direct mode the bytes reach the file before they are verified, so a
    /// [`StorageError::DigestMismatch`] leaves that range holding the bad
    /// bytes. Putting the same range again with the right data repairs it.
    #[instrument(skip_all, fields(chunk = %chunk, path = %self.path.display()))]
    pub fn put<R: Read>(
        &self,
        chunk: ChunkRange,
        expected: &Digest,
        reader: R,
    ) -> StorageResult<()> {
        let active = match &self.session {
            Session::Complete => {
                trace!("blob complete, chunk accepted without writing");
                return Ok(());
            }
            Session::Active(active) => active,
        };

        if !chunk.fits_within(active.size) {
            return Err(StorageError::InvalidRange(format!(
                "chunk {chunk} outside blob of {} bytes",
                active.size
            )));
        }

        match active.options.write_mode {
            WriteMode::Direct => active.put_direct(chunk, expected, reader)?,
            WriteMode::Buffered => active.put_buffered(chunk, expected, reader)?,
        }

        debug!(size = chunk.size(), "chunk verified");
        Ok(())
    }

    /// Release the file handle, syncing it first if configured to.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn close(self) -> StorageResult<()> {
        match self.session {
            Session::Complete => Ok(()),
            Session::Active(active) => {
                if active.options.sync_on_close {
                    active.file.sync_all()?;
                }
                trace!("blob file closed");
                Ok(())
            }
        }
    }
}

impl ActiveSession {
    fn put_direct<R: Read>(
        &self,
        chunk: ChunkRange,
        expected: &Digest,
        reader: R,
    ) -> StorageResult<()> {
        let mut writer = VerifyingWriter::new(&self.file, chunk.start());
        let received = io::copy(&mut reader.take(chunk.size()), &mut writer)?;
        check_len(chunk, received)?;
        check_digest(expected, writer.finalize())
    }

    fn put_buffered<R: Read>(
        &self,
        chunk: ChunkRange,
        expected: &Digest,
        reader: R,
    ) -> StorageResult<()> {
        let limit = self.options.max_buffered_chunk_bytes;
        let too_large = || StorageError::ChunkTooLarge {
            size: chunk.size(),
            limit,
        };
        if chunk.size() > limit {
            return Err(too_large());
        }
        let capacity = usize::try_from(chunk.size()).map_err(|_| too_large())?;

        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity).map_err(|_| too_large())?;
        let received = reader.take(chunk.size()).read_to_end(&mut buf)? as u64;
        check_len(chunk, received)?;
        check_digest(expected, Digest::compute(&buf))?;

        OffsetWriter::new(&self.file, chunk.start()).write_all(&buf)?;
        Ok(())
    }
}

fn check_len(chunk: ChunkRange, received: u64) -> StorageResult<()> {
    if received < chunk.size() {
        return Err(StorageError::UnexpectedEof {
            expected: chunk.size(),
            received,
        });
    }
    Ok(())
}

fn check_digest(expected: &Digest, actual: Digest) -> StorageResult<()> {
    if *expected != actual {
        return Err(StorageError::DigestMismatch {
            expected: *expected,
            actual,
        });
    }
    Ok(())
}
