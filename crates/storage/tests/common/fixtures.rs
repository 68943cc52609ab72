use blobcache_core::CacheConfig;
use blobcache_storage::DiskCache;
use bytes::{BufMut, Bytes, BytesMut};
use std::io::{self, Read};
use std::path::Path;

/// Reproducible pseudo-random blob contents (xorshift64*), one stream per seed.
#[allow(dead_code)]
pub fn seeded_bytes(seed: u64, len: usize) -> Bytes {
    // xorshift has a fixed point at zero.
    let mut state = seed | 1 << 63;
    let mut buf = BytesMut::with_capacity(len + 8);
    while buf.len() < len {
        state ^= state >> 12;
        state ^= state << 25;
        state ^= state >> 27;
        buf.put_u64(state.wrapping_mul(0x2545_f491_4f6c_dd1d));
    }
    buf.truncate(len);
    buf.freeze()
}

/// Open a cache with default settings rooted at `root`.
#[allow(dead_code)]
pub fn open_cache(root: &Path) -> DiskCache {
    DiskCache::open(&CacheConfig::for_testing(root)).unwrap()
}

/// Install a test subscriber honouring RUST_LOG. Safe to call repeatedly.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Yields `data`, then fails with `kind` instead of reporting end of stream.
#[allow(dead_code)]
pub struct FailingReader {
    data: Bytes,
    kind: io::ErrorKind,
}

impl FailingReader {
    #[allow(dead_code)]
    pub fn new(data: impl Into<Bytes>, kind: io::ErrorKind) -> Self {
        Self {
            data: data.into(),
            kind,
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            return Err(io::Error::new(self.kind, "stream aborted"));
        }
        let n = buf.len().min(self.data.len());
        buf[..n].copy_from_slice(&self.data.split_to(n));
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_bytes() {
        assert_eq!(seeded_bytes(42, 1000), seeded_bytes(42, 1000));
        assert_ne!(seeded_bytes(42, 1000), seeded_bytes(43, 1000));
        assert_eq!(seeded_bytes(0, 13).len(), 13);
        assert!(seeded_bytes(0, 64).iter().any(|&b| b != 0));
        assert_eq!(seeded_bytes(5, 3), seeded_bytes(5, 16).slice(..3));
    }

    #[test]
    fn test_failing_reader_yields_then_fails() {
        let mut reader = FailingReader::new(&b"abc"[..], io::ErrorKind::ConnectionReset);
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }
}
