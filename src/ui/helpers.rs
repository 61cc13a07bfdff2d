use std::error::Error;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::view::{OrderRow, SongRow};

/// Lines for one order-of-service entry: numbered title, then the
/// observation underneath when there is one.
pub(crate) fn order_item_lines(row: &OrderRow, moving: bool) -> Vec<Line<'static>> {
    let title_style = if moving {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{:>2}. ", row.number), Style::default().fg(Color::Cyan)),
        Span::styled(row.title.clone(), title_style),
    ])];
    if !row.observation.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("    {}", row.observation),
            Style::default().fg(Color::Gray),
        )));
    }
    lines
}

/// One line per song; the song on the viewer gets a marker.
pub(crate) fn song_line(row: &SongRow, moving: bool) -> Line<'static> {
    let marker = if row.active { "▶ " } else { "  " };
    let mut style = Style::default();
    if row.active {
        style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
    }
    if moving {
        style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
    }
    let mut spans = vec![Span::raw(marker), Span::styled(row.name.clone(), style)];
    if row.has_notes {
        spans.push(Span::styled("  ✎", Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Message for the status line: the error itself plus the innermost cause
/// when it adds something (an I/O reason, a JSON position).
pub(crate) fn surface_error(err: &(dyn Error + 'static)) -> String {
    let mut innermost = None;
    let mut source = err.source();
    while let Some(cause) = source {
        innermost = Some(cause);
        source = cause.source();
    }
    match innermost {
        Some(cause) => format!("{err}: {cause}"),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::error::ProgramError;

    #[test]
    fn surface_error_appends_the_root_cause() {
        let err = ProgramError::Io {
            path: "/tmp/missing.pdf".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            surface_error(&err),
            "failed to access /tmp/missing.pdf: not found"
        );

        let plain = ProgramError::Validation("The program name cannot be empty.".into());
        assert_eq!(surface_error(&plain), "The program name cannot be empty.");
    }

    #[test]
    fn observations_get_their_own_line() {
        let row = OrderRow {
            index: 0,
            number: 1,
            title: "Worship".into(),
            observation: "Two songs".into(),
        };
        assert_eq!(order_item_lines(&row, false).len(), 2);

        let bare = OrderRow {
            observation: String::new(),
            ..row
        };
        assert_eq!(order_item_lines(&bare, false).len(), 1);
    }
}
