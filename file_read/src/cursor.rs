use doc_store::{
    ChunkCursor, ChunkFilter, ChunkFindOptions, ChunkRecord, FileId, ReadPreference, SortOrder, StoreClient,
    StoreError,
};
use tracing::debug;

use crate::range::ChunkBounds;

/// Drives the sequential cursor over a file's chunk records, scoped to the
/// computed chunk bounds. Exclusively owned by one stream for its lifetime.
pub(crate) struct ChunkCursorAdapter {
    cursor: Box<dyn ChunkCursor>,
    closed: bool,
}

impl ChunkCursorAdapter {
    /// Open the cursor: filtered by the owning file and, for a mid-file
    /// window, by a non-strict sequence lower bound (an offset-skip over an
    /// unindexed scan would be O(n) in the store); sorted ascending; capped
    /// at the window's chunk count.
    pub(crate) async fn open(
        client: &dyn StoreClient,
        files_id: FileId,
        bounds: &ChunkBounds,
        read_preference: Option<ReadPreference>,
    ) -> Result<Self, StoreError> {
        let filter = ChunkFilter {
            files_id,
            min_seq: (bounds.first_chunk_index > 0).then_some(bounds.first_chunk_index),
        };
        let options = ChunkFindOptions {
            sort: SortOrder::Ascending,
            limit: Some(bounds.chunk_limit()),
            read_preference,
        };

        debug!(%files_id, min_seq = ?filter.min_seq, limit = bounds.chunk_limit(), "opening chunk cursor");

        let cursor = client.open_chunk_cursor(filter, options).await?;
        Ok(Self { cursor, closed: false })
    }

    /// Fetch the next chunk record; one round trip per call.
    pub(crate) async fn pull_next(&mut self) -> Result<Option<ChunkRecord>, StoreError> {
        self.cursor.next().await
    }

    /// Release the cursor. Idempotent.
    pub(crate) async fn close(&mut self) -> Result<(), StoreError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.cursor.close().await
    }
}
