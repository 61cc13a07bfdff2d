//! Core library surface for the Service Program Manager.
//!
//! The program model and its mutators, the SQLite-backed store with JSON
//! export/import, the editor commands that tie them together, and the
//! Ratatui front-end. The `bin` target only wires these up.
pub mod cli;
pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod logging;
pub mod models;
pub mod program;
pub mod ui;
pub mod view;
pub mod viewer;

/// Persistence entry points used by `main.rs`.
pub use db::{Store, DEFAULT_EXPORT_FILENAME};

/// The domain types other layers manipulate.
pub use models::{DocumentBlob, OrderItem, ProgramData, Song};

pub use editor::Editor;
pub use error::{ListKind, ProgramError};
pub use program::Program;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
