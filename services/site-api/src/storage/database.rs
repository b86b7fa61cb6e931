use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use once_cell::sync::OnceCell;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::info;

use super::error::StorageError;
use super::repository::{Collection, ConsumeOutcome, QuotaRecord, QuotaRepository};
use super::schema::init_database;
use super::SITE_DB_FILENAME;

/// SQLite-backed quota store. The connection is opened on first use and then
/// shared for the life of the process.
pub struct SqliteStore {
    data_dir: PathBuf,
    conn: OnceCell<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            conn: OnceCell::new(),
        }
    }

    fn connection(&self) -> Result<&Mutex<Connection>, StorageError> {
        self.conn.get_or_try_init(|| {
            std::fs::create_dir_all(&self.data_dir)?;
            let db_path = self.data_dir.join(SITE_DB_FILENAME);
            let conn = Connection::open(&db_path)?;
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            init_database(&conn)?;
            info!(path = %db_path.display(), "opened quota store");
            Ok::<_, StorageError>(Mutex::new(conn))
        })
    }

    fn select_sql(collection: Collection) -> String {
        format!(
            "SELECT identity, is_privileged, remaining, created_at, updated_at \
             FROM {} WHERE identity = ?1",
            collection.table()
        )
    }
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<QuotaRecord> {
    Ok(QuotaRecord {
        identity: row.get(0)?,
        is_privileged: row.get(1)?,
        remaining: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

impl QuotaRepository for SqliteStore {
    fn connect(&self) -> Result<(), StorageError> {
        let conn = self.connection()?.lock().map_err(|_| StorageError::Poisoned)?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    fn find(
        &self,
        collection: Collection,
        identity: &str,
    ) -> Result<Option<QuotaRecord>, StorageError> {
        let conn = self.connection()?.lock().map_err(|_| StorageError::Poisoned)?;
        let record = conn
            .query_row(&Self::select_sql(collection), params![identity], map_record)
            .optional()?;
        Ok(record)
    }

    fn consume(
        &self,
        collection: Collection,
        identity: &str,
        default_allowance: u32,
    ) -> Result<ConsumeOutcome, StorageError> {
        let mut conn = self.connection()?.lock().map_err(|_| StorageError::Poisoned)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let table = collection.table();
        let now = Utc::now();

        let inserted = tx.execute(
            &format!(
                "INSERT INTO {table} (identity, is_privileged, remaining, created_at, updated_at) \
                 VALUES (?1, 0, ?2, ?3, ?3) \
                 ON CONFLICT(identity) DO NOTHING"
            ),
            params![identity, default_allowance, now],
        )?;

        let decremented = if inserted == 0 {
            tx.execute(
                &format!(
                    "UPDATE {table} SET remaining = remaining - 1, updated_at = ?2 \
                     WHERE identity = ?1 AND is_privileged = 0 AND remaining > 0"
                ),
                params![identity, now],
            )?
        } else {
            0
        };

        let record = tx.query_row(&Self::select_sql(collection), params![identity], map_record)?;
        tx.commit()?;

        let outcome = if inserted > 0 {
            ConsumeOutcome::Created(record)
        } else if record.is_privileged {
            ConsumeOutcome::Privileged(record)
        } else if decremented > 0 {
            ConsumeOutcome::Consumed(record)
        } else {
            ConsumeOutcome::Exhausted(record)
        };
        Ok(outcome)
    }

    fn set_privileged(
        &self,
        collection: Collection,
        identity: &str,
        privileged: bool,
        default_allowance: u32,
    ) -> Result<QuotaRecord, StorageError> {
        let conn = self.connection()?.lock().map_err(|_| StorageError::Poisoned)?;
        let now = Utc::now();

        conn.execute(
            &format!(
                "INSERT INTO {} (identity, is_privileged, remaining, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?4) \
                 ON CONFLICT(identity) DO UPDATE SET \
                     is_privileged = excluded.is_privileged, \
                     updated_at = excluded.updated_at",
                collection.table()
            ),
            params![identity, privileged, default_allowance, now],
        )?;

        let record = conn
            .query_row(&Self::select_sql(collection), params![identity], map_record)
            .optional()?
            .ok_or_else(|| StorageError::RecordNotFound {
                collection: collection.table(),
                identity: identity.to_string(),
            })?;
        Ok(record)
    }
}
