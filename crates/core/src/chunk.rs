//! Chunk ranges.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An inclusive byte range `[start, end]` within a blob.
///
/// Ranges of one blob are expected not to overlap; nothing checks this
/// across calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawChunkRange")]
pub struct ChunkRange {
    start: u64,
    end: u64,
}

impl ChunkRange {
    /// Create a range, rejecting `end < start`.
    ///
    /// The largest accepted `end` is `u64::MAX - 1`, so that `size` always
    /// fits in a `u64`.
    pub fn new(start: u64, end: u64) -> crate::Result<Self> {
        if end < start {
            return Err(crate::Error::InvalidChunk(format!(
                "end ({end}) < start ({start})"
            )));
        }
        if end == u64::MAX {
            return Err(crate::Error::InvalidChunk(format!(
                "end ({end}) is past the largest addressable offset"
            )));
        }
        Ok(Self { start, end })
    }

    /// The single chunk covering a whole blob of `size` bytes.
    ///
    /// Returns `None` for an empty blob, which has no bytes to cover.
    pub fn covering(size: u64) -> Option<Self> {
        size.checked_sub(1).map(|end| Self { start: 0, end })
    }

    /// Consecutive chunks of at most `chunk_size` bytes tiling `[0, size)`.
    pub fn split(size: u64, chunk_size: u64) -> ChunkSplit {
        ChunkSplit {
            next: 0,
            size,
            chunk_size,
        }
    }

    /// First byte offset.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last byte offset (inclusive).
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of bytes in the range.
    pub fn size(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Whether the range lies inside a blob of `size` bytes.
    pub fn fits_within(&self, size: u64) -> bool {
        self.end < size
    }
}

#[derive(Deserialize)]
struct RawChunkRange {
    start: u64,
    end: u64,
}

impl TryFrom<RawChunkRange> for ChunkRange {
    type Error = crate::Error;

    fn try_from(raw: RawChunkRange) -> crate::Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl fmt::Display for ChunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for ChunkRange {
    type Err = crate::Error;

    /// Parse `"<start>-<end>"`.
    fn from_str(s: &str) -> crate::Result<Self> {
        let (start, end) = s.split_once('-').ok_or_else(|| {
            crate::Error::InvalidChunk(format!("expected <start>-<end>, got: {s}"))
        })?;
        let parse = |part: &str| {
            part.parse::<u64>()
                .map_err(|e| crate::Error::InvalidChunk(format!("{s}: {e}")))
        };
        Self::new(parse(start)?, parse(end)?)
    }
}

/// Iterator returned by [`ChunkRange::split`].
#[derive(Clone, Debug)]
pub struct ChunkSplit {
    next: u64,
    size: u64,
    chunk_size: u64,
}

impl Iterator for ChunkSplit {
    type Item = ChunkRange;

    fn next(&mut self) -> Option<ChunkRange> {
        if self.chunk_size == 0 || self.next >= self.size {
            return None;
        }
        let start = self.next;
        let end = start.saturating_add(self.chunk_size - 1).min(self.size - 1);
        self.next = end + 1;
        Some(ChunkRange { start, end })
    }
}
