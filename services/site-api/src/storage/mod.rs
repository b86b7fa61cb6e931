pub mod database;
pub mod error;
pub mod memory;
pub mod repository;
pub mod schema;

pub use database::SqliteStore;
pub use error::StorageError;
pub use memory::MemoryStore;
pub use repository::{Collection, ConsumeOutcome, QuotaRecord, QuotaRepository};

pub const SITE_DB_FILENAME: &str = "site.db";
