use std::mem;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::editor::Editor;
use crate::viewer::{DocumentViewer, SystemViewer};

use super::forms::{ConfirmSongDelete, MetadataField, MetadataForm, TextForm};
use super::helpers::{centered_rect, order_item_lines, song_line, surface_error};
use super::screens::{ListCursor, MoveState, Pane};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
const HEADER_HEIGHT: u16 = 4;
/// Height of the viewer panel under the two lists.
const VIEWER_HEIGHT: u16 = 6;
/// How long a confirmation stays in the status line.
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Fine-grained modes for the main screen. Forms and confirmations take over
/// the keyboard until they are submitted or cancelled.
enum Mode {
    Normal,
    EditingMetadata(MetadataForm),
    EditingObservation { index: usize, form: TextForm },
    EditingNotes { index: usize, form: TextForm },
    AddingSong(TextForm),
    Importing(TextForm),
    Moving(MoveState),
    ConfirmSongDelete(ConfirmSongDelete),
    ConfirmReset,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
    shown_at: Instant,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    editor: Editor<SystemViewer>,
    export_dir: PathBuf,
    pane: Pane,
    order_cursor: ListCursor,
    song_cursor: ListCursor,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(editor: Editor<SystemViewer>, export_dir: PathBuf) -> Self {
        Self {
            editor,
            export_dir,
            pane: Pane::Order,
            order_cursor: ListCursor::default(),
            song_cursor: ListCursor::default(),
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Handle a key press; returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::EditingMetadata(form) => self.handle_edit_metadata(code, form)?,
            Mode::EditingObservation { index, form } => {
                self.handle_edit_observation(code, index, form)?
            }
            Mode::EditingNotes { index, form } => self.handle_edit_notes(code, index, form)?,
            Mode::AddingSong(form) => self.handle_add_song(code, form)?,
            Mode::Importing(form) => self.handle_import(code, form)?,
            Mode::Moving(state) => self.handle_move(code, state)?,
            Mode::ConfirmSongDelete(confirm) => self.handle_confirm_song_delete(code, confirm)?,
            Mode::ConfirmReset => self.handle_confirm_reset(code)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    /// Expire confirmations once they have been visible long enough. Errors
    /// stay until the next action replaces them.
    pub(crate) fn tick(&mut self) {
        let expired = matches!(
            &self.status,
            Some(StatusMessage { kind: StatusKind::Info, shown_at, .. })
                if shown_at.elapsed() >= NOTIFICATION_TTL
        );
        if expired {
            self.status = None;
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let song_count = self.editor.view().songs.len();
        let order_count = self.editor.view().order.len();

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                if self.editor.program().active_song_index().is_some() {
                    self.editor.close_song();
                    self.set_status("Viewer cleared.", StatusKind::Info);
                } else {
                    *exit = true;
                }
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.clear_status();
                self.pane = self.pane.toggle();
            }
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-5),
            KeyCode::PageDown => self.move_cursor(5),
            KeyCode::Home => self.current_cursor().select_first(),
            KeyCode::End => {
                let len = self.current_len();
                self.current_cursor().select_last(len);
            }
            KeyCode::Enter => match self.pane {
                Pane::Songs => {
                    if let Some(index) = self.song_cursor.current(song_count) {
                        self.clear_status();
                        match self.editor.open_song(index) {
                            Ok(()) => {
                                let title = self.editor.viewer().title().to_string();
                                self.set_status(format!("Opened \"{title}\"."), StatusKind::Info);
                            }
                            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                        }
                    } else {
                        self.set_status("No song selected.", StatusKind::Error);
                    }
                }
                Pane::Order => return Ok(self.begin_observation_edit(order_count)),
            },
            KeyCode::Char('o') | KeyCode::Char('O') => {
                return Ok(self.begin_observation_edit(order_count));
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                let program = self.editor.program();
                let active = program
                    .active_song_index()
                    .zip(program.active_song().map(|song| song.notes.clone()));
                if let Some((index, notes)) = active {
                    self.clear_status();
                    return Ok(Mode::EditingNotes {
                        index,
                        form: TextForm::new("Notes", notes),
                    });
                }
                self.set_status("Open a song first to edit its notes.", StatusKind::Error);
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.editor.close_song();
                self.clear_status();
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                if let Some(state) = self.begin_move() {
                    self.clear_status();
                    return Ok(Mode::Moving(state));
                }
                self.set_status("Nothing selected to move.", StatusKind::Error);
            }
            KeyCode::Char('a') | KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::AddingSong(TextForm::new("Chord sheet", "")));
            }
            KeyCode::Char('d') | KeyCode::Char('-') | KeyCode::Delete => {
                if self.pane != Pane::Songs {
                    self.set_status("Switch to the song list to delete songs.", StatusKind::Error);
                } else if let Some(index) = self.song_cursor.current(song_count) {
                    self.clear_status();
                    let row = &self.editor.view().songs[index];
                    return Ok(Mode::ConfirmSongDelete(ConfirmSongDelete::from(row)));
                } else {
                    self.set_status("No song selected to delete.", StatusKind::Error);
                }
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                self.clear_status();
                let form = MetadataForm::from_header(&self.editor.view().header);
                return Ok(Mode::EditingMetadata(form));
            }
            KeyCode::Char('i') | KeyCode::Char('I') => {
                self.clear_status();
                return Ok(Mode::Importing(TextForm::new("Program file", "")));
            }
            KeyCode::Char('x') | KeyCode::Char('X') => self.export(),
            KeyCode::Char('R') => {
                self.clear_status();
                return Ok(Mode::ConfirmReset);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_edit_metadata(&mut self, code: KeyCode, mut form: MetadataForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.editor.set_metadata(&form.name, &form.date) {
                Ok(()) => {
                    self.set_status("Program saved.", StatusKind::Info);
                    keep_open = false;
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::EditingMetadata(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    /// Observations are saved on every keystroke, so Enter and Esc both just
    /// close the form.
    fn handle_edit_observation(
        &mut self,
        code: KeyCode,
        index: usize,
        mut form: TextForm,
    ) -> Result<Mode> {
        let changed = match code {
            KeyCode::Esc | KeyCode::Enter => return Ok(Mode::Normal),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => form.push_char(ch),
            _ => false,
        };

        if changed {
            if let Err(err) = self.editor.edit_observation(index, &form.value) {
                let message = surface_error(&err);
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
            }
        }
        Ok(Mode::EditingObservation { index, form })
    }

    fn handle_edit_notes(
        &mut self,
        code: KeyCode,
        index: usize,
        mut form: TextForm,
    ) -> Result<Mode> {
        let changed = match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Enter => {
                self.set_status("Song notes updated.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => form.push_char(ch),
            _ => false,
        };

        if changed {
            if let Err(err) = self.editor.edit_song_notes(index, &form.value) {
                let message = surface_error(&err);
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
            }
        }
        Ok(Mode::EditingNotes { index, form })
    }

    fn handle_add_song(&mut self, code: KeyCode, mut form: TextForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Add song cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => {
                form.backspace();
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            KeyCode::Enter => {
                let path = expand_path(&form.value);
                match self.editor.add_song_from_path(&path) {
                    Ok(name) => {
                        let len = self.editor.view().songs.len();
                        self.song_cursor.select(len.saturating_sub(1), len);
                        self.pane = Pane::Songs;
                        self.set_status(format!("Added \"{name}\"."), StatusKind::Info);
                        return Ok(Mode::Normal);
                    }
                    Err(err) => {
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            _ => {}
        }
        Ok(Mode::AddingSong(form))
    }

    fn handle_import(&mut self, code: KeyCode, mut form: TextForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Import cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => {
                form.backspace();
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            KeyCode::Enter => {
                let path = expand_path(&form.value);
                match self.editor.import_file(&path) {
                    Ok(()) => {
                        self.order_cursor.select_first();
                        self.song_cursor.select_first();
                        self.set_status("Program imported.", StatusKind::Info);
                        return Ok(Mode::Normal);
                    }
                    Err(err) => {
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            _ => {}
        }
        Ok(Mode::Importing(form))
    }

    fn handle_move(&mut self, code: KeyCode, mut state: MoveState) -> Result<Mode> {
        let len = match state.pane {
            Pane::Order => self.editor.view().order.len(),
            Pane::Songs => self.editor.view().songs.len(),
        };
        match code {
            KeyCode::Esc => {
                self.set_status("Move cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Up => state.shift(-1, len),
            KeyCode::Down => state.shift(1, len),
            KeyCode::Home => state.to = 0,
            KeyCode::End => state.to = len.saturating_sub(1),
            KeyCode::Enter | KeyCode::Char('m') | KeyCode::Char('M') => {
                let moved = match state.pane {
                    Pane::Order => self.editor.move_order_item(state.from, state.to),
                    Pane::Songs => self.editor.move_song(state.from, state.to),
                };
                match moved {
                    Ok(()) => {
                        let len = self.current_len();
                        self.current_cursor().select(state.to, len);
                        if state.from != state.to {
                            let message = format!("Moved \"{}\".", state.label);
                            self.set_status(message, StatusKind::Info);
                        }
                    }
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
                return Ok(Mode::Normal);
            }
            _ => {}
        }
        Ok(Mode::Moving(state))
    }

    fn handle_confirm_song_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmSongDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                match self.editor.delete_song(confirm.index) {
                    Ok(song) => {
                        let len = self.editor.view().songs.len();
                        self.song_cursor.ensure_in_bounds(len);
                        self.set_status(format!("Deleted \"{}\".", song.name), StatusKind::Info);
                    }
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmSongDelete(confirm)),
        }
    }

    fn handle_confirm_reset(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.editor.reset() {
                    Ok(()) => {
                        self.order_cursor.select_first();
                        self.song_cursor.select_first();
                        self.set_status("Program reset.", StatusKind::Info);
                    }
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.set_status("Reset cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmReset),
        }
    }

    /// Ctrl+S: explicit save.
    pub(crate) fn handle_ctrl_s(&mut self) -> Result<()> {
        if !matches!(self.mode, Mode::Normal) {
            return Ok(());
        }
        match self.editor.save() {
            Ok(()) => self.set_status("Program saved.", StatusKind::Info),
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
        Ok(())
    }

    /// Ctrl+E: export, same as `x` but reachable from inside forms. An open
    /// form stays open; only what is already saved gets exported.
    pub(crate) fn handle_ctrl_e(&mut self) -> Result<()> {
        self.export();
        Ok(())
    }

    fn export(&mut self) {
        match self.editor.export_file(&self.export_dir) {
            Ok(path) => self.set_status(
                format!("Program exported to {}.", path.display()),
                StatusKind::Info,
            ),
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    fn begin_observation_edit(&mut self, order_count: usize) -> Mode {
        match self.order_cursor.current(order_count) {
            Some(index) => {
                self.clear_status();
                self.pane = Pane::Order;
                let observation = self.editor.view().order[index].observation.clone();
                Mode::EditingObservation {
                    index,
                    form: TextForm::new("Observation", observation),
                }
            }
            None => {
                self.set_status("The order of service is empty.", StatusKind::Error);
                Mode::Normal
            }
        }
    }

    fn begin_move(&self) -> Option<MoveState> {
        let view = self.editor.view();
        match self.pane {
            Pane::Order => {
                let index = self.order_cursor.current(view.order.len())?;
                Some(MoveState::new(Pane::Order, index, view.order[index].title.clone()))
            }
            Pane::Songs => {
                let index = self.song_cursor.current(view.songs.len())?;
                Some(MoveState::new(Pane::Songs, index, view.songs[index].name.clone()))
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(VIEWER_HEIGHT),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);
        self.draw_order_list(frame, columns[0]);
        self.draw_song_list(frame, columns[1]);

        self.draw_viewer(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);

        match &self.mode {
            Mode::EditingMetadata(form) => self.draw_metadata_form(frame, area, form),
            Mode::EditingObservation { index, form } => {
                let title = format!("Observation: {}", self.editor.view().order[*index].title);
                let hint = "Saved as you type • Esc/Enter to close";
                self.draw_text_form(frame, area, &title, form, hint);
            }
            Mode::EditingNotes { form, .. } => {
                let title = format!("Notes: {}", self.editor.viewer().title());
                let hint = "Saved as you type • Enter to close";
                self.draw_text_form(frame, area, &title, form, hint);
            }
            Mode::AddingSong(form) => self.draw_text_form(
                frame,
                area,
                "Add Song",
                form,
                "Path to a chord sheet (PDF) • Enter to add • Esc to cancel",
            ),
            Mode::Importing(form) => self.draw_text_form(
                frame,
                area,
                "Import Program",
                form,
                "Path to an exported .json file • Enter to import • Esc to cancel",
            ),
            Mode::ConfirmSongDelete(confirm) => self.draw_confirm(
                frame,
                area,
                "Delete Song",
                format!("Delete \"{}\" from this program?", confirm.name),
            ),
            Mode::ConfirmReset => self.draw_confirm(
                frame,
                area,
                "Reset Program",
                "Clear every song and restore the default order of service?".to_string(),
            ),
            Mode::Moving(_) | Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let header = &self.editor.view().header;
        let block = Block::default().borders(Borders::ALL).title("Service Program");
        let lines = vec![
            Line::from(vec![
                Span::styled(header.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("  •  "),
                Span::raw(header.long_date.clone()),
            ]),
            Line::from(Span::styled(
                format!("File: {}", header.filename),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_order_list(&self, frame: &mut Frame, area: Rect) {
        let rows = &self.editor.view().order;
        let moving = self.moving_in(Pane::Order);
        let items: Vec<ListItem> = preview_order(rows.len(), moving)
            .into_iter()
            .map(|index| {
                let is_moving = moving.is_some_and(|state| state.from == index);
                ListItem::new(order_item_lines(&rows[index], is_moving))
            })
            .collect();

        let selected = moving
            .map(|state| state.to)
            .unwrap_or(self.order_cursor.selected);
        self.render_list(frame, area, "Order of Service", Pane::Order, items, selected);
    }

    fn draw_song_list(&self, frame: &mut Frame, area: Rect) {
        let rows = &self.editor.view().songs;
        if rows.is_empty() {
            let block = self.pane_block("Songs", Pane::Songs);
            let message = Paragraph::new("No songs yet. Press 'a' to add a chord sheet.")
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }

        let moving = self.moving_in(Pane::Songs);
        let items: Vec<ListItem> = preview_order(rows.len(), moving)
            .into_iter()
            .map(|index| {
                let is_moving = moving.is_some_and(|state| state.from == index);
                ListItem::new(song_line(&rows[index], is_moving))
            })
            .collect();

        let selected = moving
            .map(|state| state.to)
            .unwrap_or(self.song_cursor.selected);
        self.render_list(frame, area, "Songs", Pane::Songs, items, selected);
    }

    fn render_list(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        pane: Pane,
        items: Vec<ListItem>,
        selected: usize,
    ) {
        let focused = self.pane == pane;
        let mut state = ListState::default();
        if focused && !items.is_empty() {
            state.select(Some(selected));
        }
        let list = List::new(items)
            .block(self.pane_block(title, pane))
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("› ");
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn pane_block(&self, title: &str, pane: Pane) -> Block<'static> {
        let border_style = if self.pane == pane {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title.to_string())
    }

    fn draw_viewer(&self, frame: &mut Frame, area: Rect) {
        let viewer = self.editor.viewer();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(viewer.title().to_string());

        let lines = match self.editor.program().active_song() {
            Some(song) => {
                let notes = if song.notes.is_empty() {
                    Span::styled(
                        "(no notes, press 'n' to add)",
                        Style::default().fg(Color::DarkGray),
                    )
                } else {
                    Span::raw(song.notes.clone())
                };
                let mut lines = vec![Line::from(vec![Span::raw("Notes: "), notes])];
                if let Some(path) = viewer.current_file() {
                    lines.push(Line::from(Span::styled(
                        format!("Sheet: {}", path.display()),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                lines
            }
            None => vec![Line::from(Span::styled(
                "Select a song and press Enter to open its chord sheet.",
                Style::default().fg(Color::DarkGray),
            ))],
        };

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.mode, self.pane) {
            (Mode::Moving(_), _) => &[
                ("[↑↓]", " Choose spot   "),
                ("[Enter]", " Drop   "),
                ("[Esc]", " Cancel"),
            ],
            (Mode::Normal, Pane::Order) => &[
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Observation   "),
                ("[m]", " Move   "),
                ("[Tab]", " Songs   "),
                ("[e]", " Name/Date   "),
                ("[i/x]", " Import/Export   "),
                ("[R]", " Reset   "),
                ("[q]", " Quit"),
            ],
            (Mode::Normal, Pane::Songs) => &[
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Open   "),
                ("[n]", " Notes   "),
                ("[a]", " Add   "),
                ("[d]", " Delete   "),
                ("[m]", " Move   "),
                ("[Tab]", " Order   "),
                ("[q]", " Quit"),
            ],
            _ => &[],
        };

        let spans: Vec<Span<'static>> = keys
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_metadata_form(&self, frame: &mut Frame, area: Rect, form: &MetadataForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Program Details").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Name", MetadataField::Name),
            form.build_line("Date", MetadataField::Date),
            Line::from(""),
        ];
        lines.push(form_hint(
            form.error.as_deref(),
            "Enter to save • Tab to switch • Esc to cancel",
        ));

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let (prefix, row) = match form.active {
            MetadataField::Name => ("Name: ", 0),
            MetadataField::Date => ("Date: ", 1),
        };
        let cursor_x = inner.x + prefix.len() as u16 + form.value_len(form.active) as u16;
        frame.set_cursor_position((cursor_x, inner.y + row));
    }

    fn draw_text_form(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        form: &TextForm,
        hint: &str,
    ) {
        let popup_area = centered_rect(70, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line(),
            Line::from(""),
            form_hint(form.error.as_deref(), hint),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);

        let prefix = form.label.len() as u16 + 2;
        let cursor_x = (inner.x + prefix + form.value_len() as u16)
            .min(inner.x + inner.width.saturating_sub(1));
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, title: &str, question: String) {
        let popup_area = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        let lines = vec![
            Line::from(question),
            Line::from(""),
            Line::from(Span::styled(
                "y to confirm • n or Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            popup_area,
        );
    }

    fn moving_in(&self, pane: Pane) -> Option<&MoveState> {
        match &self.mode {
            Mode::Moving(state) if state.pane == pane => Some(state),
            _ => None,
        }
    }

    fn move_cursor(&mut self, offset: isize) {
        let len = self.current_len();
        self.current_cursor().move_selection(offset, len);
    }

    fn current_cursor(&mut self) -> &mut ListCursor {
        match self.pane {
            Pane::Order => &mut self.order_cursor,
            Pane::Songs => &mut self.song_cursor,
        }
    }

    fn current_len(&self) -> usize {
        match self.pane {
            Pane::Order => self.editor.view().order.len(),
            Pane::Songs => self.editor.view().songs.len(),
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
            shown_at: Instant::now(),
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

/// Row order to draw while an entry is being moved: the picked-up entry is
/// shown where it would land.
fn preview_order(len: usize, moving: Option<&MoveState>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    if let Some(state) = moving {
        if state.from < len && state.to < len {
            let picked = order.remove(state.from);
            order.insert(state.to, picked);
        }
    }
    order
}

fn form_hint(error: Option<&str>, hint: &str) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(Color::Gray),
        )),
    }
}

/// Accept `~/...` paths as typed in a shell.
fn expand_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim().trim_matches(&['"', '\''][..]);
    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(base_dirs) = directories::BaseDirs::new() {
            return base_dirs.home_dir().join(rest);
        }
    }
    Path::new(trimmed).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use crate::models::DocumentBlob;

    fn app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let viewer = SystemViewer::headless(dir.path().join("viewer"));
        let editor = Editor::open(Store::in_memory().unwrap(), viewer).unwrap();
        (App::new(editor, dir.path().to_path_buf()), dir)
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for key in keys {
            app.handle_key(*key).unwrap();
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    #[test]
    fn observation_is_saved_while_typing() {
        let (mut app, _dir) = app();
        press(&mut app, &[KeyCode::Down, KeyCode::Enter]);
        type_text(&mut app, "Psalm 100");

        let saved = app.editor.store().load().unwrap().unwrap();
        assert_eq!(saved.order_list[1].observation, "Psalm 100");

        press(&mut app, &[KeyCode::Enter]);
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn keyboard_move_reorders_the_order_of_service() {
        let (mut app, _dir) = app();
        press(
            &mut app,
            &[KeyCode::Char('m'), KeyCode::Down, KeyCode::Down, KeyCode::Enter],
        );
        let titles: Vec<&str> = app
            .editor
            .program()
            .order()
            .iter()
            .map(|item| item.title.as_str())
            .collect();
        assert_eq!(titles[..3], ["Worship", "Scripture Reading", "Opening & Prayer"]);
        assert_eq!(app.order_cursor.selected, 2);
    }

    #[test]
    fn export_shortcut_keeps_an_open_form() {
        let (mut app, dir) = app();
        press(&mut app, &[KeyCode::Char('e')]);
        type_text(&mut app, " draft");

        app.handle_ctrl_e().unwrap();

        match &app.mode {
            Mode::EditingMetadata(form) => assert!(form.name.ends_with(" draft")),
            _ => panic!("metadata form should stay open"),
        }
        assert!(dir.path().join(crate::db::DEFAULT_EXPORT_FILENAME).exists());
        assert!(matches!(
            app.status,
            Some(StatusMessage { kind: StatusKind::Info, .. })
        ));
    }

    #[test]
    fn deleting_a_song_asks_first() {
        let (mut app, _dir) = app();
        app.editor.add_song("Holy, Holy, Holy", DocumentBlob::default()).unwrap();
        press(&mut app, &[KeyCode::Tab, KeyCode::Char('d')]);
        assert!(matches!(app.mode, Mode::ConfirmSongDelete(_)));

        press(&mut app, &[KeyCode::Char('n')]);
        assert_eq!(app.editor.program().songs().len(), 1);

        press(&mut app, &[KeyCode::Char('d'), KeyCode::Char('y')]);
        assert!(app.editor.program().songs().is_empty());
    }

    #[test]
    fn empty_name_keeps_the_form_open_with_an_error() {
        let (mut app, _dir) = app();
        press(&mut app, &[KeyCode::Char('e')]);
        for _ in 0..40 {
            press(&mut app, &[KeyCode::Backspace]);
        }
        press(&mut app, &[KeyCode::Enter]);

        match &app.mode {
            Mode::EditingMetadata(form) => assert!(form.error.is_some()),
            _ => panic!("metadata form should stay open"),
        }
        assert!(matches!(
            app.status,
            Some(StatusMessage { kind: StatusKind::Error, .. })
        ));
    }

    #[test]
    fn confirmations_expire_but_errors_stay() {
        let (mut app, _dir) = app();
        app.set_status("Program saved.", StatusKind::Info);
        if let Some(status) = app.status.as_mut() {
            status.shown_at = Instant::now() - NOTIFICATION_TTL;
        }
        app.tick();
        assert!(app.status.is_none());

        app.set_status("Broken file.", StatusKind::Error);
        if let Some(status) = app.status.as_mut() {
            status.shown_at = Instant::now() - NOTIFICATION_TTL;
        }
        app.tick();
        assert!(app.status.is_some());
    }

    #[test]
    fn preview_shows_the_picked_entry_at_its_target() {
        let mut state = MoveState::new(Pane::Songs, 0, "A".to_string());
        state.to = 2;
        assert_eq!(preview_order(4, Some(&state)), vec![1, 2, 0, 3]);
        assert_eq!(preview_order(2, None), vec![0, 1]);
    }
}
