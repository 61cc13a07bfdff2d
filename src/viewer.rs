//! The chord-sheet viewer is an external collaborator: it is handed a blob and
//! a title to display, or told to clear itself. Nothing here looks inside the
//! document.

use std::fs;
use std::path::{Path, PathBuf};

use open::that as open_document;
use tracing::{debug, info};

use crate::error::{ProgramError, Result};
use crate::models::DocumentBlob;

/// Title shown while no song is open.
pub const VIEWER_PLACEHOLDER: &str = "Chord Sheet Viewer";

pub trait DocumentViewer {
    /// Display `document` under `title`.
    fn show(&mut self, document: &DocumentBlob, title: &str) -> Result<()>;

    /// Drop whatever is displayed and fall back to `placeholder`.
    fn clear(&mut self, placeholder: &str);

    /// Title currently displayed.
    fn title(&self) -> &str;
}

/// Hands documents to the platform's default application. The blob is first
/// materialized into a cache directory because desktop viewers want a path.
pub struct SystemViewer {
    cache_dir: PathBuf,
    title: String,
    current: Option<PathBuf>,
    launch: bool,
}

impl SystemViewer {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            title: VIEWER_PLACEHOLDER.to_string(),
            current: None,
            launch: true,
        }
    }

    /// Materialize documents without starting an external application.
    pub fn headless(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            launch: false,
            ..Self::new(cache_dir)
        }
    }

    /// Path of the file written for the document on display, if any.
    pub fn current_file(&self) -> Option<&Path> {
        self.current.as_deref()
    }
}

impl DocumentViewer for SystemViewer {
    fn show(&mut self, document: &DocumentBlob, title: &str) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)
            .map_err(|err| ProgramError::io(&self.cache_dir, err))?;

        let path = self
            .cache_dir
            .join(format!("{}.{}", file_safe(title), document.extension()));
        fs::write(&path, document.bytes()).map_err(|err| ProgramError::io(&path, err))?;

        if self.launch {
            open_document(&path).map_err(|err| ProgramError::io(&path, err))?;
            info!(path = %path.display(), "opened chord sheet");
        } else {
            debug!(path = %path.display(), "chord sheet written");
        }

        self.title = title.to_string();
        self.current = Some(path);
        Ok(())
    }

    fn clear(&mut self, placeholder: &str) {
        self.title = placeholder.to_string();
        self.current = None;
    }

    fn title(&self) -> &str {
        &self.title
    }
}

fn file_safe(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || matches!(ch, ' ' | '-' | '_') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}
