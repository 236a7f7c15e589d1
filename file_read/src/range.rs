use std::ops::Range;

use crate::error::{FileReadError, Result};

/// Chunk-aligned bounds of a requested byte window.
///
/// Computed exactly once per stream, after the file's metadata has been
/// resolved and before any chunk is fetched. Pure arithmetic over the
/// resolved length and chunk size; holds no I/O state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBounds {
    /// Requested window start, inclusive.
    pub start: u64,
    /// Requested window end, exclusive.
    pub end: u64,
    pub chunk_size: u32,
    /// Index of the first chunk the window touches.
    pub first_chunk_index: u64,
    /// One past the index of the last chunk the window touches.
    pub last_chunk_index_exclusive: u64,
    /// Leading bytes of the first chunk that fall before `start`.
    pub start_trim: u64,
    /// Bytes between `end` and the aligned end of the last chunk.
    pub end_trim: u64,
}

impl ChunkBounds {
    /// Validate the requested window against the resolved file and derive the
    /// chunk bounds. Out-of-range requests fail with a typed error; nothing
    /// is ever silently clamped.
    ///
    /// `chunk_size` must be positive; the resolver rejects records that
    /// violate this before bounds are ever computed.
    pub fn compute(length: u64, chunk_size: u32, start: Option<u64>, end: Option<u64>) -> Result<Self> {
        debug_assert!(chunk_size > 0);

        let start = start.unwrap_or(0);
        let end = end.unwrap_or(length);

        if start > length {
            return Err(FileReadError::StartOutOfRange { start, length });
        }
        if end < start {
            return Err(FileReadError::StartExceedsEnd { start, end });
        }
        if end > length {
            return Err(FileReadError::EndOutOfRange { end, length });
        }

        let chunk_size_u64 = u64::from(chunk_size);
        let first_chunk_index = start / chunk_size_u64;
        let last_chunk_index_exclusive = end.div_ceil(chunk_size_u64);

        Ok(Self {
            start,
            end,
            chunk_size,
            first_chunk_index,
            last_chunk_index_exclusive,
            start_trim: start - first_chunk_index * chunk_size_u64,
            end_trim: last_chunk_index_exclusive * chunk_size_u64 - end,
        })
    }

    /// Number of chunks the cursor is allowed to yield.
    pub fn chunk_limit(&self) -> u64 {
        self.last_chunk_index_exclusive - self.first_chunk_index
    }

    /// Byte range of a validated chunk's data that lies inside the window.
    ///
    /// The first produced chunk drops `start_trim` leading bytes; the last
    /// produced chunk keeps at most `chunk_size - end_trim` bytes, clamped to
    /// the chunk's actual length so a short final chunk under an aligned or
    /// defaulted `end` passes through untouched. Both trims apply when the
    /// window spans a single chunk. The range may be empty, which the caller
    /// treats as end of output.
    pub fn delivered_range(&self, seq: u64, raw_len: usize) -> Range<usize> {
        let start = if seq == self.first_chunk_index {
            (self.start_trim as usize).min(raw_len)
        } else {
            0
        };

        let end = if seq + 1 == self.last_chunk_index_exclusive {
            let kept = u64::from(self.chunk_size) - self.end_trim;
            raw_len.min(kept as usize)
        } else {
            raw_len
        };

        start..end.max(start)
    }
}
