mod error;
mod interface;
mod memory_client;
mod records;

pub use error::{Result, StoreError};
pub use interface::{
    ChunkCursor, ChunkFilter, ChunkFindOptions, FileQuery, FileSort, FindFileOptions, SortOrder, StoreClient,
};
pub use memory_client::{MemoryStoreClient, RoundTripCounters};
pub use records::{ChunkRecord, FileId, FileRecord, ReadPreference};
