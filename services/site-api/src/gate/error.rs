use thiserror::Error;

use crate::storage::{Collection, StorageError};

#[derive(Debug, Error)]
pub enum GateError {
    #[error("IP not found")]
    MissingIdentity,
    #[error("{}", .collection.exhaustion_message())]
    QuotaExhausted {
        collection: Collection,
        identity: String,
    },
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StorageError),
}
