//! User-facing commands. Each one applies exactly one program operation, then
//! writes the durable snapshot and rebuilds the affected display rows. The
//! front-end never touches the program directly; it calls these with plain
//! data (positions, text, paths) and redraws from [`Editor::view`].

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::db::{
    export_program, import_program, read_document, remembered_filename, Store,
    DEFAULT_EXPORT_FILENAME,
};
use crate::error::Result;
use crate::models::{DocumentBlob, Song};
use crate::program::Program;
use crate::view::ProgramView;
use crate::viewer::{DocumentViewer, VIEWER_PLACEHOLDER};

pub struct Editor<V> {
    program: Program,
    store: Store,
    viewer: V,
    view: ProgramView,
    current_filename: Option<String>,
}

impl<V: DocumentViewer> Editor<V> {
    /// Start from whatever the store holds, or from defaults.
    pub fn open(store: Store, viewer: V) -> Result<Self> {
        let data = store.load_or_seed()?;
        let program = Program::new(data);
        let view = ProgramView::build(&program, None);
        info!(
            songs = program.songs().len(),
            order_items = program.order().len(),
            "program loaded"
        );
        Ok(Self {
            program,
            store,
            viewer,
            view,
            current_filename: None,
        })
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn view(&self) -> &ProgramView {
        &self.view
    }

    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Name of the last imported file, if any.
    pub fn current_filename(&self) -> Option<&str> {
        self.current_filename.as_deref()
    }

    pub fn export_filename(&self) -> &str {
        self.current_filename
            .as_deref()
            .unwrap_or(DEFAULT_EXPORT_FILENAME)
    }

    pub fn set_metadata(&mut self, name: &str, date: &str) -> Result<()> {
        self.program.set_metadata(name, date)?;
        let saved = self.persist();
        self.refresh_header();
        saved
    }

    pub fn add_song(&mut self, name: &str, document: DocumentBlob) -> Result<()> {
        self.program.add_song(name, document);
        info!(song = name, "song added");
        let saved = self.persist();
        self.view.rebuild_songs(&self.program);
        saved
    }

    /// Read a chord sheet from disk and append it; returns the derived name.
    pub fn add_song_from_path(&mut self, path: &Path) -> Result<String> {
        let (name, document) = read_document(path)?;
        self.add_song(&name, document)?;
        Ok(name)
    }

    /// Remove a song. If it was the one on display, the viewer is cleared.
    pub fn delete_song(&mut self, index: usize) -> Result<Song> {
        let was_active = self.program.active_song_index() == Some(index);
        let removed = self.program.remove_song(index)?;
        info!(song = %removed.name, index, "song deleted");

        let saved = self.persist();
        self.view.rebuild_songs(&self.program);
        if was_active {
            self.viewer.clear(VIEWER_PLACEHOLDER);
        }
        saved.map(|()| removed)
    }

    pub fn move_song(&mut self, from: usize, to: usize) -> Result<()> {
        if from == to {
            return Ok(());
        }
        self.program.reorder_song(from, to)?;
        debug!(from, to, "song moved");
        let saved = self.persist();
        self.view.rebuild_songs(&self.program);
        saved
    }

    pub fn edit_song_notes(&mut self, index: usize, text: &str) -> Result<()> {
        self.program.set_song_notes(index, text)?;
        let saved = self.persist();
        self.view.rebuild_songs(&self.program);
        saved
    }

    /// Put a song on the viewer. The song only stays active if the viewer
    /// accepted it.
    pub fn open_song(&mut self, index: usize) -> Result<()> {
        let song = self.program.set_active_song(index)?;
        let (document, title) = (song.document.clone(), song.name.clone());

        if let Err(err) = self.viewer.show(&document, &title) {
            self.program.clear_active_song();
            self.viewer.clear(VIEWER_PLACEHOLDER);
            self.view.rebuild_songs(&self.program);
            return Err(err);
        }
        debug!(song = %title, index, "song opened");
        self.view.rebuild_songs(&self.program);
        Ok(())
    }

    pub fn close_song(&mut self) {
        self.program.clear_active_song();
        self.viewer.clear(VIEWER_PLACEHOLDER);
        self.view.rebuild_songs(&self.program);
    }

    pub fn move_order_item(&mut self, from: usize, to: usize) -> Result<()> {
        if from == to {
            return Ok(());
        }
        self.program.reorder_order_item(from, to)?;
        debug!(from, to, "order item moved");
        let saved = self.persist();
        self.view.rebuild_order(&self.program);
        saved
    }

    pub fn edit_observation(&mut self, index: usize, text: &str) -> Result<()> {
        self.program.set_order_observation(index, text)?;
        let saved = self.persist();
        self.view.rebuild_order(&self.program);
        saved
    }

    /// Explicit save.
    pub fn save(&mut self) -> Result<()> {
        self.persist()
    }

    /// Back to a blank program, forgetting the imported filename.
    pub fn reset(&mut self) -> Result<()> {
        self.program.reset_to_defaults();
        self.current_filename = None;
        info!("program reset to defaults");

        let saved = self.persist();
        self.viewer.clear(VIEWER_PLACEHOLDER);
        self.view.rebuild_all(&self.program, None);
        saved
    }

    /// Replace the whole program with the contents of `path`. The file is
    /// fully parsed before anything changes, so a bad file leaves the current
    /// program untouched.
    pub fn import_file(&mut self, path: &Path) -> Result<()> {
        let data = import_program(path)?;
        self.program.replace_all(data);
        self.current_filename = Some(remembered_filename(path));
        info!(
            path = %path.display(),
            songs = self.program.songs().len(),
            "program imported"
        );

        let saved = self.persist();
        self.viewer.clear(VIEWER_PLACEHOLDER);
        self.view
            .rebuild_all(&self.program, self.current_filename.as_deref());
        saved
    }

    /// Save, then write the export file into `dir` under the remembered or
    /// default filename.
    pub fn export_file(&mut self, dir: &Path) -> Result<PathBuf> {
        self.persist()?;
        let path = export_program(self.program.data(), dir, self.export_filename())?;
        info!(path = %path.display(), "program exported");
        Ok(path)
    }

    fn persist(&mut self) -> Result<()> {
        self.store.save(self.program.data())
    }

    fn refresh_header(&mut self) {
        self.view
            .rebuild_header(&self.program, self.current_filename.as_deref());
    }
}
