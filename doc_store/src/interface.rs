use std::fmt;

use crate::error::Result;
use crate::records::{ChunkRecord, FileId, FileRecord, ReadPreference};

/// Filter for a metadata-record lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileQuery {
    Id(FileId),
    Filename(String),
}

impl fmt::Display for FileQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileQuery::Id(id) => write!(f, "id {id}"),
            FileQuery::Filename(name) => write!(f, "filename {name:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Sort applied to a metadata lookup. Upload date is the only order the read
/// side ever asks for (revision selection over same-named files).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSort {
    UploadDate(SortOrder),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FindFileOptions {
    pub sort: Option<FileSort>,
    pub skip: Option<u64>,
    pub read_preference: Option<ReadPreference>,
}

/// Filter for opening a chunk cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkFilter {
    /// Owning file's identifier.
    pub files_id: FileId,

    /// Non-strict lower bound on `seq`. Expressed as a filter rather than an
    /// offset-skip: skipping over an unindexed scan is O(n) in the store,
    /// while a bounded range query is not.
    pub min_seq: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
pub struct ChunkFindOptions {
    /// Order of `seq` in the returned sequence.
    pub sort: SortOrder,

    /// Cap on the number of records the cursor will yield.
    pub limit: Option<u64>,

    pub read_preference: Option<ReadPreference>,
}

impl Default for ChunkFindOptions {
    fn default() -> Self {
        Self {
            sort: SortOrder::Ascending,
            limit: None,
            read_preference: None,
        }
    }
}

/// Narrow client surface of the backing document store.
///
/// The read engine consumes exactly two operations: a one-shot metadata
/// lookup and a sequential cursor over the chunk collection. Connection
/// management, retries and topology monitoring all live below this trait.
#[async_trait::async_trait]
pub trait StoreClient: Send + Sync {
    /// Look up at most one metadata record matching `query`, honoring
    /// sort/skip so callers can select among same-named revisions. Exactly
    /// one round trip.
    async fn find_file(&self, query: &FileQuery, options: &FindFileOptions) -> Result<Option<FileRecord>>;

    /// Open a cursor over the chunk collection. The cursor is exclusively
    /// owned by the caller for its lifetime.
    async fn open_chunk_cursor(&self, filter: ChunkFilter, options: ChunkFindOptions) -> Result<Box<dyn ChunkCursor>>;
}

/// A sequential cursor over chunk records. Each `next` call issues exactly
/// one round trip against the store.
#[async_trait::async_trait]
pub trait ChunkCursor: Send {
    /// Fetch the next record, or `None` once the sequence is exhausted.
    async fn next(&mut self) -> Result<Option<ChunkRecord>>;

    /// Release server-side resources held by the cursor.
    async fn close(&mut self) -> Result<()>;
}
