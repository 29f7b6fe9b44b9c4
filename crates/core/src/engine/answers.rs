use thiserror::Error;

use crate::model::ChoiceLabel;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSheetError {
    #[error("question index {index} is out of range for {len} questions")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Per-question selected choice, one slot per question.
///
/// The sheet is sized once and never grows or shrinks, so every index in
/// `0..len` always has an entry (`None` meaning unanswered).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnswerSheet {
    slots: Vec<Option<ChoiceLabel>>,
}

impl AnswerSheet {
    /// Create a sheet for `len` questions with every slot unanswered.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    /// Record `label` for `index`, replacing any earlier selection.
    ///
    /// # Errors
    ///
    /// Returns `AnswerSheetError::IndexOutOfRange` without touching the sheet
    /// if `index` is not a valid question index.
    pub fn select(&mut self, index: usize, label: ChoiceLabel) -> Result<(), AnswerSheetError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(AnswerSheetError::IndexOutOfRange { index, len })?;
        *slot = Some(label);
        Ok(())
    }

    /// Selected label at `index`; `None` when unanswered or out of range.
    #[must_use]
    pub fn selection(&self, index: usize) -> Option<ChoiceLabel> {
        self.slots.get(index).copied().flatten()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Answered flag for every question, in order.
    pub fn answered_flags(&self) -> impl Iterator<Item = bool> + '_ {
        self.slots.iter().map(Option::is_some)
    }

    #[must_use]
    pub fn slots(&self) -> &[Option<ChoiceLabel>] {
        &self.slots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sheet_is_fully_unanswered() {
        let sheet = AnswerSheet::new(4);
        assert_eq!(sheet.len(), 4);
        assert_eq!(sheet.answered_count(), 0);
        assert!(sheet.slots().iter().all(Option::is_none));
    }

    #[test]
    fn last_write_wins_per_index() {
        let mut sheet = AnswerSheet::new(3);
        sheet.select(1, ChoiceLabel::A).unwrap();
        sheet.select(1, ChoiceLabel::C).unwrap();
        assert_eq!(sheet.selection(1), Some(ChoiceLabel::C));
        assert_eq!(sheet.selection(0), None);
        assert_eq!(sheet.selection(2), None);
        assert_eq!(sheet.answered_count(), 1);
    }

    #[test]
    fn reselecting_same_label_is_idempotent() {
        let mut sheet = AnswerSheet::new(2);
        sheet.select(0, ChoiceLabel::B).unwrap();
        let before = sheet.clone();
        sheet.select(0, ChoiceLabel::B).unwrap();
        assert_eq!(sheet, before);
    }

    #[test]
    fn out_of_range_select_leaves_sheet_alone() {
        let mut sheet = AnswerSheet::new(2);
        let err = sheet.select(2, ChoiceLabel::A).unwrap_err();
        assert_eq!(err, AnswerSheetError::IndexOutOfRange { index: 2, len: 2 });
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.answered_count(), 0);
        assert_eq!(sheet.selection(7), None);
    }

    #[test]
    fn flags_track_answered_slots() {
        let mut sheet = AnswerSheet::new(3);
        sheet.select(2, ChoiceLabel::D).unwrap();
        let flags: Vec<bool> = sheet.answered_flags().collect();
        assert_eq!(flags, vec![false, false, true]);
    }
}
