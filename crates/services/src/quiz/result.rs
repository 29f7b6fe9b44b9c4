use quiz_core::model::{percentage, Difficulty, Outcome};

/// Coarse performance rating used for the results message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceTier {
    Excellent,
    Great,
    Good,
    Fair,
    KeepPracticing,
}

impl PerformanceTier {
    #[must_use]
    pub fn from_percentage(percent: u32) -> Self {
        match percent {
            90.. => Self::Excellent,
            80..=89 => Self::Great,
            70..=79 => Self::Good,
            60..=69 => Self::Fair,
            _ => Self::KeepPracticing,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent! Outstanding result.",
            Self::Great => "Great job, well done.",
            Self::Good => "Good work, keep it up.",
            Self::Fair => "Not bad, there is room to improve.",
            Self::KeepPracticing => "Keep practicing, you will get there.",
        }
    }
}

/// Three-way band used to colour scores in history listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    #[must_use]
    pub fn from_percentage(percent: u32) -> Self {
        match percent {
            80.. => Self::High,
            60..=79 => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// Presentation model for a finished attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub category: String,
    pub difficulty: Difficulty,
    pub score: u32,
    pub total: u32,
    pub incorrect: u32,
    pub percentage: u32,
    pub tier: PerformanceTier,
    pub band: ScoreBand,
}

impl QuizResult {
    #[must_use]
    pub fn from_outcome(outcome: &Outcome) -> Self {
        let percent = percentage(outcome.score, outcome.total);
        Self {
            category: outcome.category.clone(),
            difficulty: outcome.difficulty,
            score: outcome.score,
            total: outcome.total,
            incorrect: outcome.incorrect(),
            percentage: percent,
            tier: PerformanceTier::from_percentage(percent),
            band: ScoreBand::from_percentage(percent),
        }
    }

    #[must_use]
    pub fn share_line(&self) -> String {
        format!(
            "Scored {}% in {} ({}) quiz!",
            self.percentage, self.category, self.difficulty
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(score: u32, total: u32) -> Outcome {
        Outcome {
            score,
            total,
            category: "Java".to_string(),
            difficulty: Difficulty::Medium,
        }
    }

    #[test]
    fn tiers_follow_thresholds() {
        assert_eq!(PerformanceTier::from_percentage(100), PerformanceTier::Excellent);
        assert_eq!(PerformanceTier::from_percentage(90), PerformanceTier::Excellent);
        assert_eq!(PerformanceTier::from_percentage(89), PerformanceTier::Great);
        assert_eq!(PerformanceTier::from_percentage(70), PerformanceTier::Good);
        assert_eq!(PerformanceTier::from_percentage(60), PerformanceTier::Fair);
        assert_eq!(PerformanceTier::from_percentage(59), PerformanceTier::KeepPracticing);
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(ScoreBand::from_percentage(80), ScoreBand::High);
        assert_eq!(ScoreBand::from_percentage(79), ScoreBand::Medium);
        assert_eq!(ScoreBand::from_percentage(60), ScoreBand::Medium);
        assert_eq!(ScoreBand::from_percentage(0), ScoreBand::Low);
    }

    #[test]
    fn result_from_two_of_three() {
        let result = QuizResult::from_outcome(&outcome(2, 3));
        assert_eq!(result.percentage, 67);
        assert_eq!(result.incorrect, 1);
        assert_eq!(result.tier, PerformanceTier::Fair);
        assert_eq!(result.band, ScoreBand::Medium);
        assert_eq!(result.share_line(), "Scored 67% in Java (Medium) quiz!");
    }

    #[test]
    fn empty_attempt_scores_zero_percent() {
        let result = QuizResult::from_outcome(&outcome(0, 0));
        assert_eq!(result.percentage, 0);
        assert_eq!(result.tier, PerformanceTier::KeepPracticing);
    }
}
