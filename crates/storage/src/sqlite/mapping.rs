use quiz_core::model::{Difficulty, Profile, QuizSelection, Topic, UserId, Username};
use sqlx::Row;
use std::str::FromStr;
use url::Url;

use crate::repository::{LeaderboardRow, ResultRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn user_id_from_str(raw: &str) -> Result<UserId, StorageError> {
    UserId::from_str(raw).map_err(ser)
}

fn selection_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuizSelection, StorageError> {
    let topic: String = row.try_get("topic").map_err(ser)?;
    let difficulty: String = row.try_get("difficulty").map_err(ser)?;
    Ok(QuizSelection::new(
        Difficulty::from_str(&difficulty).map_err(ser)?,
        Topic::from_str(&topic).map_err(ser)?,
    ))
}

pub(crate) fn map_result_row(row: &sqlx::sqlite::SqliteRow) -> Result<ResultRecord, StorageError> {
    let user_id: String = row.try_get("user_id").map_err(ser)?;
    Ok(ResultRecord {
        id: row.try_get("id").map_err(ser)?,
        user_id: user_id_from_str(&user_id)?,
        selection: selection_from_row(row)?,
        score: u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?,
        total_questions: u32_from_i64(
            "total_questions",
            row.try_get::<i64, _>("total_questions").map_err(ser)?,
        )?,
        time_taken_secs: u32_from_i64(
            "time_taken",
            row.try_get::<i64, _>("time_taken").map_err(ser)?,
        )?,
        completed_at: row.try_get("completed_at").map_err(ser)?,
    })
}

fn avatar_from_column(raw: Option<String>) -> Result<Option<Url>, StorageError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| Url::parse(s.trim()).map_err(ser))
        .transpose()
}

pub(crate) fn map_leaderboard_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<LeaderboardRow, StorageError> {
    let result = map_result_row(row)?;
    let username: String = row.try_get("username").map_err(ser)?;
    Ok(LeaderboardRow {
        id: result.id,
        user_id: result.user_id,
        username: Username::new(username).map_err(ser)?,
        avatar_url: avatar_from_column(row.try_get("avatar_url").map_err(ser)?)?,
        selection: result.selection,
        score: result.score,
        total_questions: result.total_questions,
        time_taken_secs: result.time_taken_secs,
        completed_at: result.completed_at,
    })
}

pub(crate) fn map_profile_row(row: &sqlx::sqlite::SqliteRow) -> Result<Profile, StorageError> {
    let user_id: String = row.try_get("user_id").map_err(ser)?;
    Profile::from_persisted(
        user_id_from_str(&user_id)?,
        row.try_get("username").map_err(ser)?,
        row.try_get("avatar_url").map_err(ser)?,
    )
    .map_err(ser)
}
