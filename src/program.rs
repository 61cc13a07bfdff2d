//! The in-memory program and every rule for changing it.
//!
//! `Program` is the single owned application-state object: the program data
//! plus the back-reference to whichever song is open in the viewer. Fields are
//! private so the lists can only be changed through the named mutators below,
//! which keep the active index pointing at the same logical song.

use chrono::NaiveDate;

use crate::error::{ListKind, ProgramError, Result};
use crate::models::{
    default_order, today, DocumentBlob, OrderItem, ProgramData, Song, DATE_FORMAT,
    DEFAULT_PROGRAM_NAME,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    data: ProgramData,
    active_song: Option<usize>,
}

impl Program {
    pub fn new(data: ProgramData) -> Self {
        Self {
            data,
            active_song: None,
        }
    }

    pub fn data(&self) -> &ProgramData {
        &self.data
    }

    pub fn songs(&self) -> &[Song] {
        &self.data.songs_list
    }

    pub fn order(&self) -> &[OrderItem] {
        &self.data.order_list
    }

    pub fn active_song_index(&self) -> Option<usize> {
        self.active_song
    }

    pub fn active_song(&self) -> Option<&Song> {
        self.active_song
            .and_then(|index| self.data.songs_list.get(index))
    }

    /// Commit a new name and date together, or neither.
    pub fn set_metadata(&mut self, name: &str, date: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProgramError::Validation(
                "The program name cannot be empty.".to_string(),
            ));
        }
        let date = date.trim();
        if date.is_empty() {
            return Err(ProgramError::Validation(
                "Please choose a program date.".to_string(),
            ));
        }
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| {
            ProgramError::Validation(format!("\"{date}\" is not a valid date (YYYY-MM-DD)."))
        })?;

        self.data.program_name = name.to_string();
        self.data.program_date = date;
        Ok(())
    }

    /// Presence checks that gate every durable write.
    pub fn validate(data: &ProgramData) -> Result<()> {
        if data.program_name.trim().is_empty() {
            return Err(ProgramError::Validation(
                "The program name cannot be empty.".to_string(),
            ));
        }
        Ok(())
    }

    /// Append a song. Duplicate names are allowed.
    pub fn add_song(&mut self, name: impl Into<String>, document: DocumentBlob) -> &Song {
        self.data.songs_list.push(Song::new(name, document));
        let last = self.data.songs_list.len() - 1;
        &self.data.songs_list[last]
    }

    /// Remove a song and return it, shifting the active index when needed.
    pub fn remove_song(&mut self, index: usize) -> Result<Song> {
        check_index(ListKind::Songs, index, self.data.songs_list.len())?;
        let removed = self.data.songs_list.remove(index);

        self.active_song = match self.active_song {
            Some(active) if active == index => None,
            Some(active) if active > index => Some(active - 1),
            other => other,
        };

        Ok(removed)
    }

    pub fn reorder_song(&mut self, from: usize, to: usize) -> Result<()> {
        if from == to {
            return Ok(());
        }
        splice_move(&mut self.data.songs_list, ListKind::Songs, from, to)?;
        self.active_song = self
            .active_song
            .map(|active| follow_move(active, from, to));
        Ok(())
    }

    pub fn set_song_notes(&mut self, index: usize, text: &str) -> Result<()> {
        let len = self.data.songs_list.len();
        let song = self
            .data
            .songs_list
            .get_mut(index)
            .ok_or(ProgramError::Index {
                list: ListKind::Songs,
                index,
                len,
            })?;
        song.notes = text.trim().to_string();
        Ok(())
    }

    /// Mark a song as the one open in the viewer and hand it back for display.
    pub fn set_active_song(&mut self, index: usize) -> Result<&Song> {
        check_index(ListKind::Songs, index, self.data.songs_list.len())?;
        self.active_song = Some(index);
        Ok(&self.data.songs_list[index])
    }

    pub fn clear_active_song(&mut self) {
        self.active_song = None;
    }

    pub fn reorder_order_item(&mut self, from: usize, to: usize) -> Result<()> {
        if from == to {
            return Ok(());
        }
        splice_move(&mut self.data.order_list, ListKind::Order, from, to)
    }

    pub fn set_order_observation(&mut self, index: usize, text: &str) -> Result<()> {
        let len = self.data.order_list.len();
        let item = self
            .data
            .order_list
            .get_mut(index)
            .ok_or(ProgramError::Index {
                list: ListKind::Order,
                index,
                len,
            })?;
        item.observation = text.trim().to_string();
        Ok(())
    }

    pub fn reset_to_defaults(&mut self) {
        self.data.program_name = DEFAULT_PROGRAM_NAME.to_string();
        self.data.program_date = today();
        self.data.songs_list.clear();
        self.data.order_list = default_order();
        self.active_song = None;
    }

    /// Swap in a whole program (import). Shape repair already happened when
    /// the raw document was decoded, see [`ProgramData::from_value`].
    pub fn replace_all(&mut self, data: ProgramData) {
        self.data = data;
        self.active_song = None;
    }
}

fn check_index(list: ListKind, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(ProgramError::Index { list, index, len })
    }
}

/// Standard splice semantics: remove at `from`, then insert at `to` in the
/// shortened list.
fn splice_move<T>(items: &mut Vec<T>, list: ListKind, from: usize, to: usize) -> Result<()> {
    check_index(list, from, items.len())?;
    check_index(list, to, items.len())?;
    let moved = items.remove(from);
    items.insert(to, moved);
    Ok(())
}

/// Where an element that sat at `position` ends up after moving `from` to `to`.
fn follow_move(position: usize, from: usize, to: usize) -> usize {
    if position == from {
        to
    } else if from < position && position <= to {
        position - 1
    } else if to <= position && position < from {
        position + 1
    } else {
        position
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn blob() -> DocumentBlob {
        DocumentBlob::new("application/pdf", b"%PDF".to_vec())
    }

    fn program_with_songs(names: &[&str]) -> Program {
        let mut program = Program::default();
        for name in names {
            program.add_song(*name, blob());
        }
        program
    }

    fn song_names(program: &Program) -> Vec<&str> {
        program.songs().iter().map(|song| song.name.as_str()).collect()
    }

    #[test]
    fn add_reorder_remove_scenario() {
        let mut program = Program::default();
        assert_eq!(program.order().len(), 5);
        assert!(program.songs().is_empty());

        program.add_song("Amazing Grace", blob());
        program.reorder_song(0, 0).unwrap();
        assert_eq!(song_names(&program), ["Amazing Grace"]);

        program.remove_song(0).unwrap();
        assert!(program.songs().is_empty());
        assert_eq!(program.active_song_index(), None);
    }

    #[test]
    fn empty_name_is_rejected_without_changes() {
        let mut program = Program::default();
        program.set_metadata("Harvest Service", "2024-09-01").unwrap();

        let err = program.set_metadata("", "2024-01-01").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(program.data().program_name, "Harvest Service");
        assert_eq!(
            program.data().program_date,
            NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
        );
    }

    #[test]
    fn invalid_or_missing_date_is_rejected() {
        let mut program = Program::default();
        assert!(program.set_metadata("Vespers", "").unwrap_err().is_validation());
        assert!(program
            .set_metadata("Vespers", "2024-02-30")
            .unwrap_err()
            .is_validation());
        assert_eq!(program.data().program_name, DEFAULT_PROGRAM_NAME);
    }

    #[test]
    fn metadata_name_is_trimmed() {
        let mut program = Program::default();
        program.set_metadata("  Vespers ", "2024-12-24").unwrap();
        assert_eq!(program.data().program_name, "Vespers");
    }

    #[test]
    fn duplicate_song_names_are_allowed() {
        let program = program_with_songs(&["Holy", "Holy"]);
        assert_eq!(song_names(&program), ["Holy", "Holy"]);
    }

    #[test]
    fn removing_the_active_song_clears_it() {
        let mut program = program_with_songs(&["A", "B", "C"]);
        program.set_active_song(1).unwrap();
        program.remove_song(1).unwrap();
        assert_eq!(program.active_song_index(), None);
    }

    #[test]
    fn removing_before_the_active_song_shifts_it_down() {
        let mut program = program_with_songs(&["A", "B", "C"]);
        program.set_active_song(2).unwrap();
        program.remove_song(0).unwrap();
        assert_eq!(program.active_song_index(), Some(1));
        assert_eq!(program.active_song().unwrap().name, "C");
    }

    #[test]
    fn removing_after_the_active_song_leaves_it() {
        let mut program = program_with_songs(&["A", "B", "C"]);
        program.set_active_song(0).unwrap();
        program.remove_song(2).unwrap();
        assert_eq!(program.active_song_index(), Some(0));
    }

    #[test]
    fn out_of_bounds_indices_are_errors() {
        let mut program = program_with_songs(&["A"]);
        assert!(matches!(
            program.remove_song(1),
            Err(ProgramError::Index { list: ListKind::Songs, index: 1, len: 1 })
        ));
        assert!(program.reorder_song(0, 3).is_err());
        assert!(program.set_song_notes(4, "x").is_err());
        assert!(program.set_active_song(1).is_err());
        assert!(matches!(
            program.set_order_observation(5, "x"),
            Err(ProgramError::Index { list: ListKind::Order, .. })
        ));
        assert!(program.reorder_order_item(7, 0).is_err());
        assert_eq!(song_names(&program), ["A"]);
    }

    #[test]
    fn reorder_uses_splice_semantics() {
        let mut program = program_with_songs(&["A", "B", "C", "D"]);
        program.reorder_song(0, 2).unwrap();
        assert_eq!(song_names(&program), ["B", "C", "A", "D"]);
        program.reorder_song(3, 0).unwrap();
        assert_eq!(song_names(&program), ["D", "B", "C", "A"]);
    }

    #[test]
    fn active_song_follows_a_reorder() {
        let mut program = program_with_songs(&["A", "B", "C", "D"]);
        program.set_active_song(1).unwrap();
        program.reorder_song(1, 3).unwrap();
        assert_eq!(program.active_song().unwrap().name, "B");

        program.reorder_song(0, 3).unwrap();
        assert_eq!(program.active_song().unwrap().name, "B");

        program.reorder_song(2, 0).unwrap();
        assert_eq!(program.active_song().unwrap().name, "B");
    }

    #[test]
    fn order_items_reorder_and_take_observations() {
        let mut program = Program::default();
        program.reorder_order_item(4, 0).unwrap();
        program.set_order_observation(0, "  Benediction by the elder \n").unwrap();

        assert_eq!(program.order()[0].title, "Closing");
        assert_eq!(program.order()[0].observation, "Benediction by the elder");
        assert_eq!(program.order()[1].title, "Opening & Prayer");
    }

    #[test]
    fn song_notes_are_trimmed() {
        let mut program = program_with_songs(&["A"]);
        program.set_song_notes(0, "\tkey of G  ").unwrap();
        assert_eq!(program.songs()[0].notes, "key of G");
    }

    #[test]
    fn reset_restores_defaults() {
        let mut program = program_with_songs(&["A", "B"]);
        program.set_metadata("Vespers", "2020-01-01").unwrap();
        program.set_active_song(0).unwrap();
        program.set_order_observation(0, "edited").unwrap();

        program.reset_to_defaults();
        assert_eq!(program.data().program_name, DEFAULT_PROGRAM_NAME);
        assert_eq!(program.data().program_date, today());
        assert!(program.songs().is_empty());
        assert_eq!(program.order(), default_order().as_slice());
        assert_eq!(program.active_song_index(), None);
    }

    #[test]
    fn replace_all_clears_the_active_song() {
        let mut program = program_with_songs(&["A"]);
        program.set_active_song(0).unwrap();

        let mut incoming = ProgramData::default();
        incoming.program_name = "Imported".to_string();
        program.replace_all(incoming.clone());

        assert_eq!(program.data(), &incoming);
        assert_eq!(program.active_song_index(), None);
    }

    #[test]
    fn validate_rejects_blank_names() {
        let mut data = ProgramData::default();
        assert!(Program::validate(&data).is_ok());
        data.program_name = "   ".to_string();
        assert!(Program::validate(&data).unwrap_err().is_validation());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add,
        Remove(usize),
    }

    fn ops() -> impl Strategy<Value = Vec<Op>> {
        prop::collection::vec(
            prop_oneof![Just(Op::Add), (0usize..16).prop_map(Op::Remove)],
            0..40,
        )
    }

    proptest! {
        #[test]
        fn adds_and_removes_keep_count_and_relative_order(ops in ops()) {
            let mut program = Program::default();
            let mut expected: Vec<String> = Vec::new();
            let mut next = 0usize;

            for op in ops {
                match op {
                    Op::Add => {
                        let name = format!("song-{next}");
                        next += 1;
                        program.add_song(name.clone(), DocumentBlob::default());
                        expected.push(name);
                    }
                    Op::Remove(index) => {
                        if index < expected.len() {
                            program.remove_song(index).unwrap();
                            expected.remove(index);
                        } else {
                            prop_assert!(program.remove_song(index).is_err());
                        }
                    }
                }
            }

            let names: Vec<String> = program.songs().iter().map(|song| song.name.clone()).collect();
            prop_assert_eq!(names, expected);
        }

        #[test]
        fn reorder_to_same_position_is_a_no_op(len in 1usize..8, pick in 0usize..8) {
            let index = pick % len;
            let mut program = Program::default();
            for n in 0..len {
                program.add_song(format!("song-{n}"), DocumentBlob::default());
            }
            let before = program.clone();

            program.reorder_song(index, index).unwrap();
            program.reorder_order_item(index % 5, index % 5).unwrap();
            prop_assert_eq!(program, before);
        }
    }
}
