use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::error::{ProgramError, Result};

/// Open (creating if needed) the SQLite file backing the durable store and
/// run the lazy migration. The store is a plain key-value table: the whole
/// program lives in a single row that every save overwrites.
pub fn ensure_schema(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).map_err(|err| ProgramError::io(parent, err))?;
    }

    let conn = Connection::open(db_path)?;
    create_tables(&conn)?;
    Ok(conn)
}

/// Same schema on a throwaway in-memory database.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_tables(&conn)?;
    Ok(conn)
}

fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}
