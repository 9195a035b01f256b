use chrono::Utc;
use quiz_core::model::{Profile, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_profile_row};
use crate::repository::{ProfileRepository, StorageError};

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT user_id, username, avatar_url
                FROM profiles
                WHERE user_id = ?1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_profile_row).transpose()
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO profiles (user_id, username, avatar_url, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(user_id) DO UPDATE SET
                    username = excluded.username,
                    avatar_url = excluded.avatar_url,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(profile.user_id.to_string())
        .bind(profile.username.as_str())
        .bind(profile.avatar_url.as_ref().map(url::Url::as_str))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
