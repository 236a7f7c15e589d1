use std::sync::Arc;

use doc_store::{FileId, FileQuery, FileSort, FindFileOptions, ReadPreference, SortOrder, StoreClient};

use crate::stream::FileReadStream;

/// Read-side entry points over a chunked file store.
///
/// Cheap to construct; one instance can open any number of independent
/// streams against the same store client.
pub struct FileReader {
    client: Arc<dyn StoreClient>,
    read_preference: Option<ReadPreference>,
}

impl FileReader {
    pub fn new(client: Arc<dyn StoreClient>) -> Self {
        Self {
            client,
            read_preference: None,
        }
    }

    /// Route the metadata lookup and chunk fetches of streams opened from
    /// this reader according to `read_preference`.
    pub fn with_read_preference(self, read_preference: ReadPreference) -> Self {
        Self {
            read_preference: Some(read_preference),
            ..self
        }
    }

    /// Open a read stream over the file with the given id.
    pub fn open_read_stream(&self, id: FileId) -> FileReadStream {
        FileReadStream::new(
            self.client.clone(),
            FileQuery::Id(id),
            FindFileOptions {
                sort: None,
                skip: None,
                read_preference: self.read_preference,
            },
        )
    }

    /// Open a read stream over the most recent file stored under `filename`.
    pub fn open_read_stream_by_name(&self, filename: impl Into<String>) -> FileReadStream {
        self.open_read_stream_by_name_at_revision(filename, -1)
    }

    /// Open a read stream over one revision of the files stored under
    /// `filename`.
    ///
    /// `revision >= 0` counts up from the oldest upload (`0` is the
    /// original); `revision < 0` counts back from the newest (`-1` is the
    /// most recent). Expressed as an upload-date sort plus skip on the
    /// metadata lookup, so it costs nothing beyond the one find round trip.
    pub fn open_read_stream_by_name_at_revision(&self, filename: impl Into<String>, revision: i64) -> FileReadStream {
        let (order, skip) = if revision >= 0 {
            (SortOrder::Ascending, revision as u64)
        } else {
            (SortOrder::Descending, (-(revision + 1)) as u64)
        };

        FileReadStream::new(
            self.client.clone(),
            FileQuery::Filename(filename.into()),
            FindFileOptions {
                sort: Some(FileSort::UploadDate(order)),
                skip: Some(skip),
                read_preference: self.read_preference,
            },
        )
    }
}
