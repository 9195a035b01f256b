use quiz_core::model::{Topic, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_leaderboard_row, map_result_row};
use crate::repository::{
    LeaderboardRepository, LeaderboardRow, NewResultRecord, ResultRecord, ResultRepository,
    StorageError,
};

#[async_trait::async_trait]
impl ResultRepository for SqliteRepository {
    async fn append_result(&self, record: &NewResultRecord) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO quiz_results (
                    user_id, topic, difficulty, score,
                    total_questions, time_taken, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(record.user_id.to_string())
        .bind(record.selection.topic.as_str())
        .bind(record.selection.difficulty.as_str())
        .bind(i64::from(record.score))
        .bind(i64::from(record.total_questions))
        .bind(i64::from(record.time_taken_secs))
        .bind(record.completed_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn get_result(&self, id: i64) -> Result<ResultRecord, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    id, user_id, topic, difficulty, score,
                    total_questions, time_taken, completed_at
                FROM quiz_results
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_result_row(&row)
    }

    async fn results_for_user(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<ResultRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, user_id, topic, difficulty, score,
                    total_questions, time_taken, completed_at
                FROM quiz_results
                WHERE user_id = ?1
                ORDER BY completed_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(user_id.to_string())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_result_row).collect()
    }
}

#[async_trait::async_trait]
impl LeaderboardRepository for SqliteRepository {
    async fn top_results(
        &self,
        topic: Option<Topic>,
        limit: u32,
    ) -> Result<Vec<LeaderboardRow>, StorageError> {
        let mut sql = String::from(
            r"
                SELECT
                    r.id, r.user_id, r.topic, r.difficulty, r.score,
                    r.total_questions, r.time_taken, r.completed_at,
                    p.username, p.avatar_url
                FROM quiz_results r
                INNER JOIN profiles p ON p.user_id = r.user_id
            ",
        );

        let mut bind_index = 1;
        if topic.is_some() {
            sql.push_str(" WHERE r.topic = ?1");
            bind_index += 1;
        }
        sql.push_str(" ORDER BY r.score DESC, r.time_taken ASC, r.id ASC");
        sql.push_str(" LIMIT ?");
        sql.push_str(&bind_index.to_string());

        let mut query = sqlx::query(&sql);
        if let Some(topic) = topic {
            query = query.bind(topic.as_str());
        }
        query = query.bind(i64::from(limit));

        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_leaderboard_row(&row)?);
        }
        Ok(out)
    }
}
