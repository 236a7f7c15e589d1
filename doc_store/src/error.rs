use std::sync::Arc;

use thiserror::Error;

/// Errors reported by a backing document store.
///
/// A real backend maps its wire and driver failures onto these shapes; the
/// read engine above wraps them without retrying.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("query failed: {0}")]
    Query(String),

    #[error("cursor failed: {0}")]
    Cursor(String),

    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(Arc::new(err))
    }
}
