use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::question::QuestionError;

/// Closed set of quiz difficulty levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Static pacing and presentation facts attached to a difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyProfile {
    /// Countdown allowance per question, in seconds.
    pub seconds_per_question: u32,
    /// Expected duration shown when picking a quiz.
    pub expected_duration: &'static str,
    /// Typical question count shown when picking a quiz.
    pub typical_questions: &'static str,
}

const EASY: DifficultyProfile = DifficultyProfile {
    seconds_per_question: 60,
    expected_duration: "10-15 mins",
    typical_questions: "5-10",
};

const MEDIUM: DifficultyProfile = DifficultyProfile {
    seconds_per_question: 90,
    expected_duration: "15-20 mins",
    typical_questions: "10-15",
};

const HARD: DifficultyProfile = DifficultyProfile {
    seconds_per_question: 120,
    expected_duration: "20-30 mins",
    typical_questions: "15-20",
};

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    #[must_use]
    pub fn profile(self) -> &'static DifficultyProfile {
        match self {
            Difficulty::Easy => &EASY,
            Difficulty::Medium => &MEDIUM,
            Difficulty::Hard => &HARD,
        }
    }

    #[must_use]
    pub fn seconds_per_question(self) -> u32 {
        self.profile().seconds_per_question
    }

    /// Total countdown budget for a set of `question_count` questions.
    ///
    /// Saturates at `u32::MAX` instead of overflowing.
    #[must_use]
    pub fn time_budget(self, question_count: usize) -> u32 {
        let count = u32::try_from(question_count).unwrap_or(u32::MAX);
        count.saturating_mul(self.seconds_per_question())
    }

    /// Canonical name, as stored and sent over the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| QuestionError::InvalidDifficulty(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_scales_with_allowance() {
        assert_eq!(Difficulty::Easy.time_budget(5), 300);
        assert_eq!(Difficulty::Medium.time_budget(5), 450);
        assert_eq!(Difficulty::Hard.time_budget(5), 600);
        assert_eq!(Difficulty::Hard.time_budget(0), 0);
    }

    #[test]
    fn budget_saturates() {
        assert_eq!(Difficulty::Hard.time_budget(usize::MAX), u32::MAX);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!(" HARD ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("Extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn descriptors_follow_level() {
        assert_eq!(Difficulty::Easy.profile().expected_duration, "10-15 mins");
        assert_eq!(Difficulty::Hard.profile().typical_questions, "15-20");
        assert_eq!(Difficulty::Medium.to_string(), "Medium");
    }

    #[test]
    fn serializes_as_canonical_name() {
        assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), "\"Hard\"");
        assert_eq!(format!("{:<6}|", Difficulty::Easy), "Easy  |");
    }
}
