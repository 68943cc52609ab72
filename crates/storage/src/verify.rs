//! Positional, hashing writers used for chunk writes.
//!
//! Both writers address the file by absolute offset instead of moving its
//! cursor, so any number of them can share one `&File` as long as their
//! byte windows do not overlap.

use blobcache_core::{Digest, DigestHasher};
use std::fs::File;
use std::io::{self, Write};

#[cfg(unix)]
fn write_at(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.write_at(buf, offset)
}

#[cfg(windows)]
fn write_at(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_write(buf, offset)
}

/// Writes sequentially into a file starting at a fixed offset.
pub struct OffsetWriter<'a> {
    file: &'a File,
    offset: u64,
}

impl<'a> OffsetWriter<'a> {
    pub fn new(file: &'a File, offset: u64) -> Self {
        Self { file, offset }
    }

    /// Offset the next write lands at.
    pub fn position(&self) -> u64 {
        self.offset
    }
}

impl Write for OffsetWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = write_at(self.file, buf, self.offset)?;
        self.offset += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An [`OffsetWriter`] that also hashes every byte it writes.
///
/// It knows nothing about the digest the bytes are supposed to have; callers
/// compare [`VerifyingWriter::finalize`] against their own expectation.
pub struct VerifyingWriter<'a> {
    inner: OffsetWriter<'a>,
    hasher: DigestHasher,
    written: u64,
}

impl<'a> VerifyingWriter<'a> {
    pub fn new(file: &'a File, offset: u64) -> Self {
        Self {
            inner: OffsetWriter::new(file, offset),
            hasher: Digest::hasher(),
            written: 0,
        }
    }

    /// Bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Digest of everything written.
    pub fn finalize(self) -> Digest {
        self.hasher.finalize()
    }
}

impl Write for VerifyingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        // Only what reached the file counts toward the digest.
        self.hasher.update(&buf[..n]);
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
