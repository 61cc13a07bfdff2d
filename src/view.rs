//! Display rows derived from the program. The lists are rebuilt from scratch
//! after every mutation instead of being patched; they only ever hold what
//! one person typed in for one service, so a full rebuild is cheap.

use crate::program::Program;

/// Shown in the header until a program file has been imported.
pub const NO_FILE_LABEL: &str = "No file loaded";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRow {
    pub index: usize,
    pub name: String,
    pub has_notes: bool,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub index: usize,
    /// 1-based position shown next to the title.
    pub number: usize,
    pub title: String,
    pub observation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderView {
    pub name: String,
    pub date: String,
    pub long_date: String,
    pub filename: String,
}

/// Everything the front-end draws, kept in step with the model by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgramView {
    pub header: HeaderView,
    pub songs: Vec<SongRow>,
    pub order: Vec<OrderRow>,
}

impl ProgramView {
    pub fn build(program: &Program, filename: Option<&str>) -> Self {
        let mut view = Self::default();
        view.rebuild_all(program, filename);
        view
    }

    pub fn rebuild_all(&mut self, program: &Program, filename: Option<&str>) {
        self.rebuild_header(program, filename);
        self.rebuild_songs(program);
        self.rebuild_order(program);
    }

    pub fn rebuild_header(&mut self, program: &Program, filename: Option<&str>) {
        let data = program.data();
        self.header = HeaderView {
            name: data.program_name.clone(),
            date: data.program_date.to_string(),
            long_date: data.long_date(),
            filename: filename.unwrap_or(NO_FILE_LABEL).to_string(),
        };
    }

    pub fn rebuild_songs(&mut self, program: &Program) {
        let active = program.active_song_index();
        self.songs = program
            .songs()
            .iter()
            .enumerate()
            .map(|(index, song)| SongRow {
                index,
                name: song.name.clone(),
                has_notes: !song.notes.is_empty(),
                active: active == Some(index),
            })
            .collect();
    }

    pub fn rebuild_order(&mut self, program: &Program) {
        self.order = program
            .order()
            .iter()
            .enumerate()
            .map(|(index, item)| OrderRow {
                index,
                number: index + 1,
                title: item.title.clone(),
                observation: item.observation.clone(),
            })
            .collect();
    }
}
