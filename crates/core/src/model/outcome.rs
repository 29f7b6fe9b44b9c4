use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;

/// Final scored result of a completed quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub score: u32,
    pub total: u32,
    pub category: String,
    pub difficulty: Difficulty,
}

impl Outcome {
    /// Number of questions not answered correctly, unanswered ones included.
    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.total.saturating_sub(self.score)
    }

    /// Score as a whole percentage, rounded half up. Zero for an empty attempt.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total)
    }
}

/// Rounded percentage of `part` over `whole`, or zero when `whole` is zero.
#[must_use]
pub fn percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = u64::from(part);
    let whole = u64::from(whole);
    let rounded = (part * 200 + whole) / (whole * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
