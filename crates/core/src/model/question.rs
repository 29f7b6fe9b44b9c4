use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use super::difficulty::Difficulty;
use super::ids::QuestionId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("invalid choice label: {0:?}")]
    InvalidChoiceLabel(String),
    #[error("invalid difficulty: {0:?}")]
    InvalidDifficulty(String),
}

//
// ─── CHOICE LABEL ─────────────────────────────────────────────────────────────
//

/// Label of one of the four answer choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChoiceLabel {
    A,
    B,
    C,
    D,
}

impl ChoiceLabel {
    pub const ALL: [ChoiceLabel; 4] = [ChoiceLabel::A, ChoiceLabel::B, ChoiceLabel::C, ChoiceLabel::D];

    /// Position of this label within a question's choices (A = 0).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            ChoiceLabel::A => 0,
            ChoiceLabel::B => 1,
            ChoiceLabel::C => 2,
            ChoiceLabel::D => 3,
        }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            ChoiceLabel::A => 'A',
            ChoiceLabel::B => 'B',
            ChoiceLabel::C => 'C',
            ChoiceLabel::D => 'D',
        }
    }

    /// Parses a single letter, ignoring case.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(ChoiceLabel::A),
            'B' => Some(ChoiceLabel::B),
            'C' => Some(ChoiceLabel::C),
            'D' => Some(ChoiceLabel::D),
            _ => None,
        }
    }
}

impl fmt::Display for ChoiceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for ChoiceLabel {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                ChoiceLabel::from_char(c).ok_or_else(|| QuestionError::InvalidChoiceLabel(s.into()))
            }
            _ => Err(QuestionError::InvalidChoiceLabel(s.into())),
        }
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A multiple-choice question with four labeled choices.
///
/// Well-formedness (non-empty texts) is the question source's responsibility;
/// the quiz engine accepts whatever it is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: Option<QuestionId>,
    text: String,
    choices: [String; 4],
    correct: ChoiceLabel,
    category: String,
    difficulty: Difficulty,
}

impl Question {
    #[must_use]
    pub fn new<S: Into<String>>(
        text: impl Into<String>,
        choices: [S; 4],
        correct: ChoiceLabel,
        category: impl Into<String>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id: None,
            text: text.into(),
            choices: choices.map(Into::into),
            correct,
            category: category.into(),
            difficulty,
        }
    }

    /// Attach the identifier assigned by a persisted question bank.
    #[must_use]
    pub fn with_id(mut self, id: QuestionId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn id(&self) -> Option<QuestionId> {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn choices(&self) -> &[String; 4] {
        &self.choices
    }

    #[must_use]
    pub fn choice(&self, label: ChoiceLabel) -> &str {
        &self.choices[label.index()]
    }

    #[must_use]
    pub fn correct(&self) -> ChoiceLabel {
        self.correct
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// True when the prompt and every choice text are non-blank.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.text.trim().is_empty() && self.choices.iter().all(|c| !c.trim().is_empty())
    }
}

//
// ─── QUESTION SET ─────────────────────────────────────────────────────────────
//

/// Ordered, immutable questions for one (category, difficulty) pair.
///
/// Cloning is cheap: the questions are shared, so a retake can reuse the set
/// without fetching it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    category: String,
    difficulty: Difficulty,
    questions: Arc<[Question]>,
}

impl QuestionSet {
    #[must_use]
    pub fn new(category: impl Into<String>, difficulty: Difficulty, questions: Vec<Question>) -> Self {
        Self {
            category: category.into(),
            difficulty,
            questions: questions.into(),
        }
    }

    #[must_use]
    pub fn empty(category: impl Into<String>, difficulty: Difficulty) -> Self {
        Self::new(category, difficulty, Vec::new())
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Countdown budget for the whole set, in seconds.
    #[must_use]
    pub fn time_budget(&self) -> u32 {
        self.difficulty.time_budget(self.len())
    }

    /// Returns true when both sets share the same underlying questions.
    #[must_use]
    pub fn shares_questions_with(&self, other: &QuestionSet) -> bool {
        Arc::ptr_eq(&self.questions, &other.questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question::new(
            "2 + 2?",
            ["3", "4", "5", "22"],
            ChoiceLabel::B,
            "Math",
            Difficulty::Easy,
        )
    }

    #[test]
    fn label_parsing_ignores_case() {
        assert_eq!("c".parse::<ChoiceLabel>().unwrap(), ChoiceLabel::C);
        assert_eq!(" D".parse::<ChoiceLabel>().unwrap(), ChoiceLabel::D);
        assert!("E".parse::<ChoiceLabel>().is_err());
        assert!("AB".parse::<ChoiceLabel>().is_err());
        assert!("".parse::<ChoiceLabel>().is_err());
    }

    #[test]
    fn choice_lookup_uses_label_position() {
        let q = sample();
        assert_eq!(q.choice(ChoiceLabel::B), "4");
        assert_eq!(q.choice(ChoiceLabel::D), "22");
        assert!(q.id().is_none());
        assert_eq!(q.clone().with_id(QuestionId::new(9)).id(), Some(QuestionId::new(9)));
    }

    #[test]
    fn well_formed_requires_all_texts() {
        assert!(sample().is_well_formed());
        let blank = Question::new("Q", ["a", " ", "c", "d"], ChoiceLabel::A, "X", Difficulty::Easy);
        assert!(!blank.is_well_formed());
    }

    #[test]
    fn set_clone_shares_questions() {
        let set = QuestionSet::new("Math", Difficulty::Medium, vec![sample(), sample()]);
        let copy = set.clone();
        assert!(set.shares_questions_with(&copy));
        assert_eq!(set.time_budget(), 180);
        assert!(QuestionSet::empty("Math", Difficulty::Hard).is_empty());
    }
}
