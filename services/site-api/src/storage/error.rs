use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
    #[error("store connection poisoned")]
    Poisoned,
    #[error("record {identity} not found in {collection}")]
    RecordNotFound {
        collection: &'static str,
        identity: String,
    },
}
