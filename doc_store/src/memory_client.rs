use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use bytes::Bytes;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::interface::{
    ChunkCursor, ChunkFilter, ChunkFindOptions, FileQuery, FileSort, FindFileOptions, SortOrder, StoreClient,
};
use crate::records::{ChunkRecord, FileId, FileRecord};

/// Counts the round trips a [`MemoryStoreClient`] has served, one counter per
/// operation on the client surface. Tests read these to pin down exactly how
/// many store interactions a code path performed.
#[derive(Debug, Default)]
pub struct RoundTripCounters {
    pub find_file: AtomicU64,
    pub cursor_open: AtomicU64,
    pub cursor_next: AtomicU64,
    pub cursor_close: AtomicU64,
}

impl RoundTripCounters {
    pub fn find_file_calls(&self) -> u64 {
        self.find_file.load(Ordering::Relaxed)
    }

    pub fn cursor_open_calls(&self) -> u64 {
        self.cursor_open.load(Ordering::Relaxed)
    }

    pub fn cursor_next_calls(&self) -> u64 {
        self.cursor_next.load(Ordering::Relaxed)
    }

    pub fn cursor_close_calls(&self) -> u64 {
        self.cursor_close.load(Ordering::Relaxed)
    }
}

#[derive(Default)]
struct StoreData {
    files: Vec<FileRecord>,
    chunks: Vec<ChunkRecord>,
}

/// In-process implementation of [`StoreClient`] over plain vectors.
///
/// Serves two purposes: an embedded backend for callers that do not need a
/// networked store, and the fixture harness for the read-engine tests. Honors
/// the same filter/sort/skip/limit semantics a real document store would;
/// read preference is accepted and ignored (there is only one node).
#[derive(Default)]
pub struct MemoryStoreClient {
    data: Mutex<StoreData>,
    counters: Arc<RoundTripCounters>,
}

impl MemoryStoreClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counters(&self) -> &RoundTripCounters {
        &self.counters
    }

    /// Insert a metadata record as-is.
    pub fn insert_file(&self, file: FileRecord) {
        self.data.lock().unwrap().files.push(file);
    }

    /// Insert chunk records as-is, without reconciling them against any
    /// metadata record. Tests use this to stage malformed sequences.
    pub fn insert_chunks(&self, chunks: impl IntoIterator<Item = ChunkRecord>) {
        self.data.lock().unwrap().chunks.extend(chunks);
    }

    /// Chunk `content` at `chunk_size` and store it under a fresh id,
    /// returning the created metadata record.
    ///
    /// This is the minimal write side needed to seed fixtures; the full
    /// upload bookkeeping lives outside this layer.
    pub fn store_bytes(&self, filename: &str, chunk_size: u32, content: &[u8]) -> FileRecord {
        assert!(chunk_size > 0, "chunk_size must be positive");

        let file = FileRecord {
            id: FileId::new(),
            length: content.len() as u64,
            chunk_size,
            filename: filename.to_owned(),
            upload_date: SystemTime::now(),
            content_type: None,
            aliases: None,
            metadata: None,
        };

        let chunks = content.chunks(chunk_size as usize).enumerate().map(|(i, piece)| ChunkRecord {
            files_id: file.id,
            seq: i as u64,
            data: Bytes::copy_from_slice(piece),
        });

        let mut data = self.data.lock().unwrap();
        data.chunks.extend(chunks);
        data.files.push(file.clone());

        debug!(file_id = %file.id, length = file.length, chunk_size, "stored file content");

        file
    }
}

#[async_trait::async_trait]
impl StoreClient for MemoryStoreClient {
    async fn find_file(&self, query: &FileQuery, options: &FindFileOptions) -> Result<Option<FileRecord>> {
        self.counters.find_file.fetch_add(1, Ordering::Relaxed);

        let data = self.data.lock().unwrap();
        let mut matches: Vec<&FileRecord> = data
            .files
            .iter()
            .filter(|f| match query {
                FileQuery::Id(id) => f.id == *id,
                FileQuery::Filename(name) => f.filename == *name,
            })
            .collect();

        if let Some(FileSort::UploadDate(order)) = options.sort {
            // Ties on upload date resolve by id so that skip-based revision
            // selection is deterministic.
            matches.sort_by_key(|f| (f.upload_date, f.id));
            if order == SortOrder::Descending {
                matches.reverse();
            }
        }

        let skip = options.skip.unwrap_or(0);
        Ok(matches.into_iter().nth(skip as usize).cloned())
    }

    async fn open_chunk_cursor(&self, filter: ChunkFilter, options: ChunkFindOptions) -> Result<Box<dyn ChunkCursor>> {
        self.counters.cursor_open.fetch_add(1, Ordering::Relaxed);

        let data = self.data.lock().unwrap();
        let mut matches: Vec<ChunkRecord> = data
            .chunks
            .iter()
            .filter(|c| c.files_id == filter.files_id && filter.min_seq.is_none_or(|min| c.seq >= min))
            .cloned()
            .collect();

        matches.sort_by_key(|c| c.seq);
        if options.sort == SortOrder::Descending {
            matches.reverse();
        }
        if let Some(limit) = options.limit {
            matches.truncate(limit as usize);
        }

        debug!(
            files_id = %filter.files_id,
            min_seq = ?filter.min_seq,
            limit = ?options.limit,
            matched = matches.len(),
            "opened chunk cursor"
        );

        Ok(Box::new(MemoryChunkCursor {
            remaining: matches.into(),
            closed: false,
            counters: self.counters.clone(),
        }))
    }
}

struct MemoryChunkCursor {
    remaining: VecDeque<ChunkRecord>,
    closed: bool,
    counters: Arc<RoundTripCounters>,
}

#[async_trait::async_trait]
impl ChunkCursor for MemoryChunkCursor {
    async fn next(&mut self) -> Result<Option<ChunkRecord>> {
        if self.closed {
            return Err(StoreError::Cursor("cursor is closed".to_owned()));
        }
        self.counters.cursor_next.fetch_add(1, Ordering::Relaxed);
        Ok(self.remaining.pop_front())
    }

    async fn close(&mut self) -> Result<()> {
        self.counters.cursor_close.fetch_add(1, Ordering::Relaxed);
        self.closed = true;
        self.remaining.clear();
        Ok(())
    }
}
