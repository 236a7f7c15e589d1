use doc_store::{FileQuery, FileRecord, FindFileOptions, StoreClient};
use tracing::debug;

use crate::error::{FileReadError, Result};

/// Outcome of the one-shot metadata lookup.
pub(crate) enum Resolved {
    /// Zero-length file: the stream completes immediately, with no chunk
    /// fetches. Not an error.
    Empty(FileRecord),
    File(FileRecord),
}

/// Resolve the file's metadata record, passing sort/skip/read-preference
/// straight through to the store. Issues exactly one lookup.
pub(crate) async fn resolve_metadata(
    client: &dyn StoreClient,
    query: &FileQuery,
    options: &FindFileOptions,
) -> Result<Resolved> {
    let Some(file) = client.find_file(query, options).await? else {
        return Err(FileReadError::FileNotFound {
            query: query.to_string(),
        });
    };

    debug!(file_id = %file.id, length = file.length, chunk_size = file.chunk_size, "resolved file metadata");

    if file.length == 0 {
        return Ok(Resolved::Empty(file));
    }

    if file.chunk_size == 0 {
        return Err(FileReadError::CorruptFileRecord {
            reason: format!("file {} has {} bytes but a zero chunk size", file.id, file.length),
        });
    }

    Ok(Resolved::File(file))
}
