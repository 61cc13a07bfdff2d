//! Error taxonomy shared by the program model and the persistence layer.
//!
//! The binary and the TUI wrap these in `anyhow` with extra context, but the
//! variants stay distinct so callers can tell a user mistake (validation), a
//! contract slip in the editor (index), and a bad import file (parse) apart.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Which ordered list an index referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Songs,
    Order,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListKind::Songs => write!(f, "song list"),
            ListKind::Order => write!(f, "order of service"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProgramError {
    /// Metadata that would block a save: empty name or a missing date.
    #[error("{0}")]
    Validation(String),

    #[error("position {index} is outside the {list} ({len} entries)")]
    Index {
        list: ListKind,
        index: usize,
        len: usize,
    },

    /// The import file could not be read as structured data at all.
    #[error("could not read the program file")]
    Parse(#[source] serde_json::Error),

    #[error("storage failure")]
    Storage(#[from] rusqlite::Error),

    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode program data")]
    Encode(#[source] serde_json::Error),
}

impl ProgramError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ProgramError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ProgramError::Validation(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, ProgramError::Parse(_))
    }
}

pub type Result<T, E = ProgramError> = std::result::Result<T, E>;
