use quiz_core::model::AttemptRecord;

use super::SqliteRepository;
use super::mapping::{conn, map_attempt_row};
use crate::repository::{AttemptRow, ProgressHistory, ProgressSink, StorageError};

#[async_trait::async_trait]
impl ProgressSink for SqliteRepository {
    async fn record_attempt(&self, attempt: &AttemptRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO attempts (
                    category, difficulty, score, total_questions, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(attempt.category())
        .bind(attempt.difficulty().as_str())
        .bind(i64::from(attempt.score()))
        .bind(i64::from(attempt.total()))
        .bind(attempt.completed_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl ProgressHistory for SqliteRepository {
    async fn list_attempts(
        &self,
        category: Option<&str>,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError> {
        let mut sql = String::from(
            r"
                SELECT id, category, difficulty, score, total_questions, completed_at
                FROM attempts
            ",
        );
        if category.is_some() {
            sql.push_str(" WHERE category = ?1");
            sql.push_str(" ORDER BY completed_at DESC, id DESC LIMIT ?2");
        } else {
            sql.push_str(" ORDER BY completed_at DESC, id DESC LIMIT ?1");
        }

        let mut query = sqlx::query(&sql);
        if let Some(category) = category {
            query = query.bind(category);
        }
        query = query.bind(i64::from(limit));

        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;
        rows.iter().map(map_attempt_row).collect()
    }
}
