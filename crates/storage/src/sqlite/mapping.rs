use chrono::{DateTime, Utc};
use quiz_core::model::{
    AnswerOption, Game, GameId, GameQuestion, GameQuestionId, GameToken, OptionId, Question,
    QuestionId, Topic, TopicId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation())
}

/// Map a failed insert/update: a dangling reference means the parent is missing.
pub(crate) fn write_err(e: sqlx::Error) -> StorageError {
    if is_foreign_key_violation(&e) {
        StorageError::NotFound
    } else {
        conn(e)
    }
}

/// Map a failed delete: a restricting reference means the row is protected.
pub(crate) fn delete_err(e: sqlx::Error) -> StorageError {
    if is_foreign_key_violation(&e) {
        StorageError::Protected
    } else {
        conn(e)
    }
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn topic_id_from_i64(v: i64) -> Result<TopicId, StorageError> {
    Ok(TopicId::new(i64_to_u64("topic_id", v)?))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn option_id_from_i64(v: i64) -> Result<OptionId, StorageError> {
    Ok(OptionId::new(i64_to_u64("option_id", v)?))
}

pub(crate) fn game_id_from_i64(v: i64) -> Result<GameId, StorageError> {
    Ok(GameId::new(i64_to_u64("game_id", v)?))
}

pub(crate) fn slot_id_from_i64(v: i64) -> Result<GameQuestionId, StorageError> {
    Ok(GameQuestionId::new(i64_to_u64("slot_id", v)?))
}

pub(crate) fn map_topic_row(row: &SqliteRow) -> Result<Topic, StorageError> {
    Topic::new(
        topic_id_from_i64(row.try_get("id").map_err(ser)?)?,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<String, _>("description").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<Question, StorageError> {
    let time_limit_ms = i64_to_u64("time_limit_ms", row.try_get("time_limit_ms").map_err(ser)?)?;
    Ok(Question::from_persisted(
        question_id_from_i64(row.try_get("id").map_err(ser)?)?,
        topic_id_from_i64(row.try_get("topic_id").map_err(ser)?)?,
        row.try_get("statement").map_err(ser)?,
        time_limit_ms,
        row.try_get("explanation").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    ))
}

pub(crate) fn map_option_row(row: &SqliteRow) -> Result<AnswerOption, StorageError> {
    let position: i64 = row.try_get("position").map_err(ser)?;
    let position = u8::try_from(position)
        .map_err(|_| StorageError::Serialization(format!("invalid position: {position}")))?;
    Ok(AnswerOption::from_persisted(
        option_id_from_i64(row.try_get("id").map_err(ser)?)?,
        question_id_from_i64(row.try_get("question_id").map_err(ser)?)?,
        row.try_get("text").map_err(ser)?,
        row.try_get::<i64, _>("is_correct").map_err(ser)? != 0,
        position,
    ))
}

pub(crate) fn map_game_row(row: &SqliteRow) -> Result<Game, StorageError> {
    let token: Uuid = row.try_get("token").map_err(ser)?;
    let completed_at: Option<DateTime<Utc>> = row.try_get("completed_at").map_err(ser)?;
    Game::from_persisted(
        game_id_from_i64(row.try_get("id").map_err(ser)?)?,
        GameToken::from_uuid(token),
        topic_id_from_i64(row.try_get("topic_id").map_err(ser)?)?,
        row.try_get::<Option<i64>, _>("current_slot_id")
            .map_err(ser)?
            .map(slot_id_from_i64)
            .transpose()?,
        row.try_get::<i64, _>("is_complete").map_err(ser)? != 0,
        row.try_get("created_at").map_err(ser)?,
        completed_at,
    )
    .map_err(ser)
}

pub(crate) fn map_slot_row(row: &SqliteRow) -> Result<GameQuestion, StorageError> {
    let position: i64 = row.try_get("position").map_err(ser)?;
    let order = u32::try_from(position)
        .map_err(|_| StorageError::Serialization(format!("invalid position: {position}")))?;
    Ok(GameQuestion::from_persisted(
        slot_id_from_i64(row.try_get("id").map_err(ser)?)?,
        game_id_from_i64(row.try_get("game_id").map_err(ser)?)?,
        question_id_from_i64(row.try_get("question_id").map_err(ser)?)?,
        order,
        row.try_get::<Option<i64>, _>("selected_option_id")
            .map_err(ser)?
            .map(option_id_from_i64)
            .transpose()?,
        row.try_get("answered_at").map_err(ser)?,
    ))
}
