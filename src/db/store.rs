use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ProgramError, Result};
use crate::models::ProgramData;
use crate::program::Program;

use super::connection::{ensure_schema, open_in_memory};

/// Key of the single row that holds the saved program.
pub const PROGRAM_KEY: &str = "churchProgram";

/// Durable slot for the current program. Every save replaces the stored
/// snapshot wholesale; there is no merging and the last write wins.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self {
            conn: ensure_schema(db_path)?,
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: open_in_memory()?,
        })
    }

    /// Validate and write the full snapshot. A program that fails validation
    /// is never written, not even partially.
    pub fn save(&self, data: &ProgramData) -> Result<()> {
        Program::validate(data)?;
        let json = serde_json::to_string(data).map_err(ProgramError::Encode)?;

        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![PROGRAM_KEY, json],
        )?;
        debug!(
            songs = data.songs_list.len(),
            order_items = data.order_list.len(),
            bytes = json.len(),
            "program saved"
        );
        Ok(())
    }

    /// Return the saved program, or `None` when nothing was ever saved or the
    /// stored value cannot be read back as a program.
    pub fn load(&self) -> Result<Option<ProgramData>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![PROGRAM_KEY],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "stored program is not valid JSON, ignoring it");
                return Ok(None);
            }
        };
        match ProgramData::from_value(&value) {
            Some(data) => Ok(Some(data)),
            None => {
                warn!("stored program is not an object, ignoring it");
                Ok(None)
            }
        }
    }

    /// Saved program if there is one, otherwise a fresh default program.
    pub fn load_or_seed(&self) -> Result<ProgramData> {
        Ok(self.load()?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentBlob, Song};

    #[test]
    fn load_is_none_until_something_is_saved() {
        let store = Store::in_memory().unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.load_or_seed().unwrap().order_list.len(), 5);
    }

    #[test]
    fn save_overwrites_the_previous_snapshot() {
        let store = Store::in_memory().unwrap();
        let mut data = ProgramData::default();
        store.save(&data).unwrap();

        data.program_name = "Midweek Prayer".to_string();
        data.songs_list.push(Song::new(
            "How Great Thou Art",
            DocumentBlob::new("application/pdf", vec![1, 2, 3]),
        ));
        store.save(&data).unwrap();

        assert_eq!(store.load().unwrap(), Some(data));
    }

    #[test]
    fn invalid_program_is_not_written() {
        let store = Store::in_memory().unwrap();
        let saved = ProgramData::default();
        store.save(&saved).unwrap();

        let mut broken = saved.clone();
        broken.program_name = String::new();
        assert!(store.save(&broken).unwrap_err().is_validation());
        assert_eq!(store.load().unwrap(), Some(saved));
    }

    #[test]
    fn corrupt_snapshot_falls_back_to_defaults() {
        let store = Store::in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)",
                params![PROGRAM_KEY, "{\"programName\": "],
            )
            .unwrap();

        assert_eq!(store.load().unwrap(), None);
        let seeded = store.load_or_seed().unwrap();
        assert_eq!(seeded.program_name, ProgramData::default().program_name);
        assert!(seeded.songs_list.is_empty());

        store.save(&ProgramData::default()).unwrap();
        assert!(store.load().unwrap().is_some());
    }

    #[test]
    fn program_survives_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("program.sqlite");

        let mut data = ProgramData::default();
        data.program_name = "Christmas Eve".to_string();
        Store::open(&path).unwrap().save(&data).unwrap();

        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.load().unwrap(), Some(data));
    }
}
