use quiz_core::model::{
    AttemptId, AttemptRecord, ChoiceLabel, Difficulty, Question, QuestionId,
};
use sqlx::Row;

use crate::repository::{AttemptRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn attempt_id_from_i64(v: i64) -> Result<AttemptId, StorageError> {
    Ok(AttemptId::new(i64_to_u64("attempt_id", v)?))
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let id = question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let category: String = row.try_get("category").map_err(ser)?;
    let difficulty: Difficulty = row
        .try_get::<String, _>("difficulty")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let text: String = row.try_get("question_text").map_err(ser)?;
    let choices: [String; 4] = [
        row.try_get("option_a").map_err(ser)?,
        row.try_get("option_b").map_err(ser)?,
        row.try_get("option_c").map_err(ser)?,
        row.try_get("option_d").map_err(ser)?,
    ];
    let correct: ChoiceLabel = row
        .try_get::<String, _>("correct_answer")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;

    Ok(Question::new(text, choices, correct, category, difficulty).with_id(id))
}

pub(crate) fn map_attempt_row(row: &sqlx::sqlite::SqliteRow) -> Result<AttemptRow, StorageError> {
    let id = attempt_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let category: String = row.try_get("category").map_err(ser)?;
    let difficulty: Difficulty = row
        .try_get::<String, _>("difficulty")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let score = u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?;
    let total = u32_from_i64(
        "total_questions",
        row.try_get::<i64, _>("total_questions").map_err(ser)?,
    )?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    let record = AttemptRecord::from_persisted(category, difficulty, score, total, completed_at)
        .map_err(ser)?;
    Ok(AttemptRow::new(id, record))
}
