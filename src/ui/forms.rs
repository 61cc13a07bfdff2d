use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::view::{HeaderView, SongRow};

/// Name and date of the program, edited together and committed on Enter.
#[derive(Default, Clone)]
pub(crate) struct MetadataForm {
    pub(crate) name: String,
    pub(crate) date: String,
    pub(crate) active: MetadataField,
    pub(crate) error: Option<String>,
}

/// Fields available within the metadata form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum MetadataField {
    #[default]
    Name,
    Date,
}

impl MetadataForm {
    /// Populate the form from what the header currently shows.
    pub(crate) fn from_header(header: &HeaderView) -> Self {
        Self {
            name: header.name.clone(),
            date: header.date.clone(),
            active: MetadataField::Name,
            error: None,
        }
    }

    /// Swap focus between the name and date fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            MetadataField::Name => MetadataField::Date,
            MetadataField::Date => MetadataField::Name,
        };
    }

    /// Append a character to the active field. Dates only take digits and
    /// dashes.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            MetadataField::Name => {
                if !ch.is_control() {
                    self.name.push(ch);
                    true
                } else {
                    false
                }
            }
            MetadataField::Date => {
                if (ch.is_ascii_digit() || ch == '-') && self.date.len() < 10 {
                    self.date.push(ch);
                    true
                } else {
                    false
                }
            }
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            MetadataField::Name => {
                self.name.pop();
            }
            MetadataField::Date => {
                self.date.pop();
            }
        }
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: MetadataField) -> Line<'static> {
        let (value, placeholder) = match field {
            MetadataField::Name => (&self.name, "<required>"),
            MetadataField::Date => (&self.date, "YYYY-MM-DD"),
        };
        input_line(field_name, value, placeholder, self.active == field)
    }

    pub(crate) fn value_len(&self, field: MetadataField) -> usize {
        match field {
            MetadataField::Name => self.name.chars().count(),
            MetadataField::Date => self.date.chars().count(),
        }
    }
}

/// Single free-text input: observations, song notes, and file paths.
#[derive(Clone)]
pub(crate) struct TextForm {
    pub(crate) label: &'static str,
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl TextForm {
    pub(crate) fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value.push(ch);
        self.error = None;
        true
    }

    pub(crate) fn backspace(&mut self) -> bool {
        self.value.pop().is_some()
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        input_line(self.label, &self.value, "", true)
    }

    pub(crate) fn value_len(&self) -> usize {
        self.value.chars().count()
    }
}

#[derive(Clone)]
pub(crate) struct ConfirmSongDelete {
    pub(crate) index: usize,
    pub(crate) name: String,
}

impl ConfirmSongDelete {
    pub(crate) fn from(row: &SongRow) -> Self {
        Self {
            index: row.index,
            name: row.name.clone(),
        }
    }
}

fn input_line(field_name: &str, value: &str, placeholder: &str, is_active: bool) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}
