use thiserror::Error;

use doc_store::StoreError;

/// Errors surfaced by a file read stream.
///
/// Everything except [`ConfigurationAfterFlowing`] is terminal for the
/// stream: it is delivered once through the stream item and no data or end
/// event follows it. `ConfigurationAfterFlowing` is a synchronous, local
/// failure of the configuration call itself; the stream is unaffected.
///
/// [`ConfigurationAfterFlowing`]: FileReadError::ConfigurationAfterFlowing
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum FileReadError {
    #[error("no file found for {query}")]
    FileNotFound { query: String },

    #[error("start offset {start} is past the end of the file (length {length})")]
    StartOutOfRange { start: u64, length: u64 },

    #[error("end offset {end} is past the end of the file (length {length})")]
    EndOutOfRange { end: u64, length: u64 },

    #[error("start offset {start} exceeds end offset {end}")]
    StartExceedsEnd { start: u64, end: u64 },

    #[error("expected chunk {expected} but the store returned chunk {actual}; a chunk is missing")]
    ChunkMissing { expected: u64, actual: u64 },

    #[error("unexpected extra chunk {actual} (expected {expected})")]
    ExtraChunk { expected: u64, actual: u64 },

    #[error("chunk {seq} has {actual} bytes, expected {expected}")]
    ChunkWrongSize { seq: u64, expected: u64, actual: u64 },

    #[error("corrupt file record: {reason}")]
    CorruptFileRecord { reason: String },

    /// A fetch or close failure reported by the backing store, wrapped as-is.
    /// Retrying belongs to the layer below, never here.
    #[error("store error: {0}")]
    Cursor(#[from] StoreError),

    #[error("the read range can no longer be configured once data has been requested")]
    ConfigurationAfterFlowing,
}

pub type Result<T> = std::result::Result<T, FileReadError>;
