use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Applies versioned schema migrations that have not run yet.
///
/// Version 1 creates profiles, quiz results, stored objects and the leaderboard index.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS profiles (
                    user_id TEXT PRIMARY KEY,
                    username TEXT NOT NULL,
                    avatar_url TEXT,
                    updated_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        // No foreign key to profiles: results may be written before a profile exists.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_results (
                    id INTEGER PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    topic TEXT NOT NULL,
                    difficulty TEXT NOT NULL,
                    score INTEGER NOT NULL CHECK (score >= 0),
                    total_questions INTEGER NOT NULL CHECK (total_questions > 0),
                    time_taken INTEGER NOT NULL CHECK (time_taken >= 0),
                    completed_at TEXT NOT NULL,
                    CHECK (score <= total_questions)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS objects (
                    bucket TEXT NOT NULL,
                    path TEXT NOT NULL,
                    content_type TEXT NOT NULL,
                    bytes BLOB NOT NULL,
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (bucket, path)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_quiz_results_leaderboard
                    ON quiz_results (topic, score DESC, time_taken ASC, id ASC);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_quiz_results_user_completed
                    ON quiz_results (user_id, completed_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
