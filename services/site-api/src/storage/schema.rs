use rusqlite::Connection;

use super::Collection;

fn table_schema(table: &str) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {table} (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    identity TEXT NOT NULL UNIQUE,
    is_privileged INTEGER NOT NULL DEFAULT 0,
    remaining INTEGER NOT NULL CHECK (remaining >= 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#
    )
}

pub fn init_database(conn: &Connection) -> rusqlite::Result<()> {
    for collection in Collection::ALL {
        conn.execute_batch(&table_schema(collection.table()))?;
    }
    Ok(())
}
