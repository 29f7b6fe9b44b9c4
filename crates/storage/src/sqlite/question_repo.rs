use quiz_core::model::{Difficulty, Question, QuestionId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, map_question_row, question_id_from_i64, ser};
use crate::repository::{QuestionBank, QuestionSource, StorageError};

#[async_trait::async_trait]
impl QuestionSource for SqliteRepository {
    async fn fetch_questions(
        &self,
        category: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, category, difficulty, question_text,
                    option_a, option_b, option_c, option_d, correct_answer
                FROM questions
                WHERE category = ?1 AND difficulty = ?2
                ORDER BY id ASC
            ",
        )
        .bind(category)
        .bind(difficulty.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_question_row).collect()
    }
}

#[async_trait::async_trait]
impl QuestionBank for SqliteRepository {
    async fn add_questions(&self, questions: &[Question]) -> Result<Vec<QuestionId>, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let mut ids = Vec::with_capacity(questions.len());

        for question in questions {
            let [a, b, c, d] = question.choices();
            let res = sqlx::query(
                r"
                    INSERT OR IGNORE INTO questions (
                        category, difficulty, question_text,
                        option_a, option_b, option_c, option_d, correct_answer
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ",
            )
            .bind(question.category())
            .bind(question.difficulty().as_str())
            .bind(question.text())
            .bind(a.as_str())
            .bind(b.as_str())
            .bind(c.as_str())
            .bind(d.as_str())
            .bind(question.correct().to_string())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

            if res.rows_affected() > 0 {
                ids.push(question_id_from_i64(res.last_insert_rowid())?);
            }
        }

        tx.commit().await.map_err(conn)?;
        Ok(ids)
    }

    async fn list_categories(&self) -> Result<Vec<String>, StorageError> {
        let rows = sqlx::query("SELECT DISTINCT category FROM questions ORDER BY category ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("category").map_err(ser))
            .collect()
    }
}
