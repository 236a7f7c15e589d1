//! Read-side streaming engine for files stored as fixed-size chunk records
//! in a document store.
//!
//! A [`FileReader`] opens a [`FileReadStream`] over one stored file; the
//! stream resolves the file's metadata record, translates the requested byte
//! window into chunk bounds, and then drives a sequential cursor over the
//! chunk collection under consumer demand, validating chunk ordering and
//! size as it goes and trimming the boundary chunks to the window. The
//! write side and bucket administration live elsewhere; this crate consumes
//! the store only through the narrow [`doc_store`] client traits.

mod cursor;
mod error;
mod range;
mod reader;
mod resolve;
mod stream;
mod validate;

pub use error::{FileReadError, Result};
pub use range::ChunkBounds;
pub use reader::FileReader;
pub use stream::FileReadStream;
