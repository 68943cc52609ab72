// Resumption tests: already-complete blobs and partially written files

mod common;

use blobcache_core::{CacheConfig, ChunkRange, Digest, LayoutConfig};
use blobcache_storage::DiskCache;
use common::{FailingReader, open_cache, seeded_bytes};
use std::io;
use tempfile::TempDir;

fn slice_of<'a>(data: &'a [u8], chunk: &ChunkRange) -> &'a [u8] {
    &data[chunk.start() as usize..=chunk.end() as usize]
}

#[test]
fn test_complete_blob_ignores_every_put() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open_cache(temp_dir.path());

    let data = seeded_bytes(1, 1000);
    let digest = Digest::compute(&data);
    let path = cache.path_for(&digest);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, &data).unwrap();

    let writer = cache.open_for_write(digest, 1000).unwrap();
    assert!(writer.is_complete());

    // Wrong digests, short streams, failing streams and out-of-range chunks
    // are all accepted without effect.
    let chunk = ChunkRange::new(0, 99).unwrap();
    writer
        .put(chunk, &Digest::compute(b"nope"), &b"garbage"[..])
        .unwrap();
    writer
        .put(chunk, &Digest::compute(b"nope"), io::empty())
        .unwrap();
    writer
        .put(
            ChunkRange::new(900, 5000).unwrap(),
            &digest,
            FailingReader::new(&b""[..], io::ErrorKind::BrokenPipe),
        )
        .unwrap();
    writer.close().unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), &data[..]);
}

#[test]
fn test_reopen_keeps_partial_content() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open_cache(temp_dir.path());

    let data = seeded_bytes(2, 64 * 1024);
    let digest = Digest::compute(&data);
    let size = data.len() as u64;
    let chunks: Vec<_> = ChunkRange::split(size, 16 * 1024).collect();
    assert_eq!(chunks.len(), 4);

    // First attempt writes two chunks, then is interrupted.
    let first = cache.open_for_write(digest, size).unwrap();
    for chunk in &chunks[..2] {
        let bytes = slice_of(&data, chunk);
        first.put(*chunk, &Digest::compute(bytes), bytes).unwrap();
    }
    drop(first);
    assert_eq!(cache.stat(&digest).unwrap(), Some(32 * 1024));
    assert!(!cache.is_complete(&digest, size).unwrap());

    // The resumed attempt only writes what is missing.
    let resumed = cache.open_for_write(digest, size).unwrap();
    assert!(!resumed.is_complete());
    for chunk in &chunks[2..] {
        let bytes = slice_of(&data, chunk);
        resumed.put(*chunk, &Digest::compute(bytes), bytes).unwrap();
    }
    resumed.close().unwrap();

    assert!(cache.is_complete(&digest, size).unwrap());
    assert_eq!(
        std::fs::read(cache.path_for(&digest)).unwrap(),
        &data[..],
        "earlier chunks must survive the reopen"
    );
}

#[test]
fn test_sharded_layout_resume() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = CacheConfig::for_testing(temp_dir.path());
    config.layout = LayoutConfig::Sharded;
    config.sync_on_close = true;
    let cache = DiskCache::open(&config).unwrap();

    let data = seeded_bytes(9, 300);
    let digest = Digest::compute(&data);

    let writer = cache.open_for_write(digest, 300).unwrap();
    writer
        .put(ChunkRange::covering(300).unwrap(), &digest, &data[..])
        .unwrap();
    writer.close().unwrap();

    let hex = digest.to_hex();
    let expected = temp_dir
        .path()
        .join("blobs")
        .join("sha256")
        .join(&hex[..2])
        .join(&hex[2..4])
        .join(&hex);
    assert_eq!(std::fs::read(expected).unwrap(), &data[..]);
    assert!(cache.open_for_write(digest, 300).unwrap().is_complete());
}

#[test]
fn test_empty_blob() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open_cache(temp_dir.path());
    let digest = Digest::compute(b"");

    // Nothing to write: opening creates the empty file, which is complete.
    let writer = cache.open_for_write(digest, 0).unwrap();
    assert!(!writer.is_complete());
    writer.close().unwrap();

    assert!(cache.is_complete(&digest, 0).unwrap());
    assert!(cache.open_for_write(digest, 0).unwrap().is_complete());
}
