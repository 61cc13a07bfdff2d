/// The two editable lists side by side on the main screen.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Pane {
    Order,
    Songs,
}

impl Pane {
    pub(crate) fn toggle(self) -> Self {
        match self {
            Pane::Order => Pane::Songs,
            Pane::Songs => Pane::Order,
        }
    }
}

/// Selection inside one list. The list itself lives in the editor's view, so
/// the cursor is re-clamped against the current length after every rebuild.
#[derive(Default, Debug)]
pub(crate) struct ListCursor {
    pub(crate) selected: usize,
}

impl ListCursor {
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let last = len as isize - 1;
        let new = (self.selected as isize + offset).clamp(0, last);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    pub(crate) fn select(&mut self, index: usize, len: usize) {
        self.selected = index;
        self.ensure_in_bounds(len);
    }

    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    /// Current position, or `None` for an empty list.
    pub(crate) fn current(&self, len: usize) -> Option<usize> {
        (self.selected < len).then_some(self.selected)
    }
}

/// Keyboard stand-in for drag and drop: an entry is picked up at `from` and
/// dropped wherever `to` points when the user confirms.
#[derive(Debug, Clone)]
pub(crate) struct MoveState {
    pub(crate) pane: Pane,
    pub(crate) from: usize,
    pub(crate) to: usize,
    pub(crate) label: String,
}

impl MoveState {
    pub(crate) fn new(pane: Pane, from: usize, label: String) -> Self {
        Self {
            pane,
            from,
            to: from,
            label,
        }
    }

    pub(crate) fn shift(&mut self, offset: isize, len: usize) {
        if len == 0 {
            return;
        }
        let last = len as isize - 1;
        self.to = (self.to as isize + offset).clamp(0, last) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_stays_inside_the_list() {
        let mut cursor = ListCursor::default();
        cursor.move_selection(-3, 4);
        assert_eq!(cursor.selected, 0);
        cursor.move_selection(10, 4);
        assert_eq!(cursor.selected, 3);

        cursor.ensure_in_bounds(2);
        assert_eq!(cursor.current(2), Some(1));
        cursor.ensure_in_bounds(0);
        assert_eq!(cursor.current(0), None);
    }

    #[test]
    fn move_target_is_clamped() {
        let mut state = MoveState::new(Pane::Songs, 1, "Holy".to_string());
        state.shift(5, 3);
        assert_eq!(state.to, 2);
        state.shift(-9, 3);
        assert_eq!(state.to, 0);
        assert_eq!(state.from, 1);
    }
}
