use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Opaque identifier of a stored file.
///
/// Backed by a ULID so freshly minted ids sort roughly by creation time,
/// which keeps the chunk collection clustered per file in ordered stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(Ulid);

impl FileId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for FileId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Ulid::from_str(s)?))
    }
}

/// The metadata record of a stored file.
///
/// One record per file; the chunk collection holds the content. Once a read
/// stream has resolved this record it treats it as an immutable snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,

    /// Total content length in bytes.
    pub length: u64,

    /// Bytes per chunk; every chunk except possibly the last carries exactly
    /// this many bytes. Always > 0 for a well-formed record.
    pub chunk_size: u32,

    pub filename: String,

    pub upload_date: SystemTime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,

    /// Free-form application metadata stored alongside the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl FileRecord {
    /// Number of chunk records a well-formed file of this length has.
    pub fn chunk_count(&self) -> u64 {
        if self.chunk_size == 0 {
            return 0;
        }
        self.length.div_ceil(self.chunk_size as u64)
    }
}

/// One stored chunk of a file's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Back-reference to the owning file's metadata record.
    pub files_id: FileId,

    /// 0-based position of this chunk within the file.
    pub seq: u64,

    pub data: Bytes,
}

/// Where a lookup may be served from, passed through to the backing store.
///
/// An embedded or single-node backend is free to ignore this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPreference {
    #[default]
    Primary,
    PrimaryPreferred,
    Secondary,
    SecondaryPreferred,
    Nearest,
}
