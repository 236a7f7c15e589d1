use doc_store::ChunkRecord;

use crate::error::{FileReadError, Result};

/// Sequence-integrity checker for arriving chunks.
///
/// Ordering is enforced here, never assumed from the backing cursor's sort.
/// `bytes_delivered` tracks the raw, pre-trim byte count: skipped leading
/// chunks of a mid-file window count as already consumed, and a trimmed
/// boundary chunk still contributes its full stored length. The expected
/// size of each chunk, including the short final one, falls out of that
/// accounting.
#[derive(Debug)]
pub(crate) struct ChunkSequenceValidator {
    length: u64,
    chunk_size: u32,
    expected_seq: u64,
    bytes_delivered: u64,
}

impl ChunkSequenceValidator {
    pub(crate) fn new(length: u64, chunk_size: u32, first_chunk_index: u64) -> Self {
        Self {
            length,
            chunk_size,
            expected_seq: first_chunk_index,
            bytes_delivered: first_chunk_index * u64::from(chunk_size),
        }
    }

    /// Validate one arriving chunk. Any failure is terminal for the stream.
    pub(crate) fn validate(&mut self, chunk: ChunkRecord) -> Result<ChunkRecord> {
        let remaining = self.length - self.bytes_delivered;
        let expected_size = remaining.min(u64::from(self.chunk_size));

        if chunk.seq > self.expected_seq {
            return Err(FileReadError::ChunkMissing {
                expected: self.expected_seq,
                actual: chunk.seq,
            });
        }
        if chunk.seq < self.expected_seq {
            return Err(FileReadError::ExtraChunk {
                expected: self.expected_seq,
                actual: chunk.seq,
            });
        }

        let actual_size = chunk.data.len() as u64;
        if actual_size != expected_size {
            if remaining == 0 {
                // The object was already fully accounted for; anything more
                // is a duplicate or stray record.
                return Err(FileReadError::ExtraChunk {
                    expected: self.expected_seq,
                    actual: chunk.seq,
                });
            }
            return Err(FileReadError::ChunkWrongSize {
                seq: chunk.seq,
                expected: expected_size,
                actual: actual_size,
            });
        }

        self.expected_seq += 1;
        self.bytes_delivered += actual_size;

        Ok(chunk)
    }
}
