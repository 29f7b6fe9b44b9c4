use chrono::{DateTime, Utc};
use std::sync::Arc;

use quiz_core::model::{AttemptId, AttemptRecord, Difficulty};
use storage::repository::{AttemptRow, ProgressHistory};

use crate::error::HistoryError;
use crate::quiz::ScoreBand;

/// Upper bound used when aggregating the whole history.
const STATS_SCAN_LIMIT: u32 = 10_000;

/// Presentation-agnostic list item for one persisted attempt.
///
/// No pre-formatted strings: the caller formats timestamps and percentages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptListItem {
    pub id: AttemptId,
    pub category: String,
    pub difficulty: Difficulty,
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
    pub band: ScoreBand,
    pub completed_at: DateTime<Utc>,
}

impl AttemptListItem {
    #[must_use]
    pub fn from_row(row: &AttemptRow) -> Self {
        let record = &row.record;
        let percent = record.percentage();
        Self {
            id: row.id,
            category: record.category().to_string(),
            difficulty: record.difficulty(),
            score: record.score(),
            total: record.total(),
            percentage: percent,
            band: ScoreBand::from_percentage(percent),
            completed_at: record.completed_at(),
        }
    }
}

/// Aggregate figures over a set of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressStats {
    pub total_quizzes: u32,
    /// Pooled percentage: total correct over total questions.
    pub average_percent: u32,
    pub best_percent: u32,
}

impl ProgressStats {
    /// All zero for an empty history.
    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AttemptRecord>) -> Self {
        let mut stats = Self::default();
        let mut score_sum: u64 = 0;
        let mut total_sum: u64 = 0;
        for record in records {
            stats.total_quizzes += 1;
            score_sum += u64::from(record.score());
            total_sum += u64::from(record.total());
            stats.best_percent = stats.best_percent.max(record.percentage());
        }
        stats.average_percent = pooled_percentage(score_sum, total_sum);
        stats
    }
}

/// Rounded half up, like `quiz_core::model::percentage`, over wide sums.
fn pooled_percentage(score: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    u32::try_from((score * 200 + total) / (total * 2)).unwrap_or(100)
}

/// Read-side service over the attempt history.
#[derive(Clone)]
pub struct ProgressHistoryService {
    history: Arc<dyn ProgressHistory>,
}

impl ProgressHistoryService {
    #[must_use]
    pub fn new(history: Arc<dyn ProgressHistory>) -> Self {
        Self { history }
    }

    /// Recent attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if the history cannot be read.
    pub async fn list(
        &self,
        category: Option<&str>,
        limit: u32,
    ) -> Result<Vec<AttemptListItem>, HistoryError> {
        let rows = self.history.list_attempts(category, limit).await?;
        Ok(rows.iter().map(AttemptListItem::from_row).collect())
    }

    /// Aggregate statistics, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if the history cannot be read.
    pub async fn stats(&self, category: Option<&str>) -> Result<ProgressStats, HistoryError> {
        let rows = self.history.list_attempts(category, STATS_SCAN_LIMIT).await?;
        Ok(ProgressStats::from_records(rows.iter().map(|row| &row.record)))
    }

    /// Distinct categories with at least one attempt, sorted.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if the history cannot be read.
    pub async fn categories(&self) -> Result<Vec<String>, HistoryError> {
        let rows = self.history.list_attempts(None, STATS_SCAN_LIMIT).await?;
        let mut categories: Vec<String> = rows
            .iter()
            .map(|row| row.record.category().to_string())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }
}
