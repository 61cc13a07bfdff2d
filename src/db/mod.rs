//! Persistence split across logical submodules: the SQLite-backed durable
//! slot and the export/import files.

mod connection;
mod files;
mod store;

pub use connection::ensure_schema;
pub use files::{
    export_program, import_program, parse_program, read_document, remembered_filename,
    serialize_program, DEFAULT_EXPORT_FILENAME,
};
pub use store::{Store, PROGRAM_KEY};
