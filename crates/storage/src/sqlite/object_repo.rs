use chrono::Utc;
use sqlx::Row;
use url::Url;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{ObjectKey, ObjectStore, StorageError, StoredObject, join_public_url};

#[async_trait::async_trait]
impl ObjectStore for SqliteRepository {
    async fn put_object(
        &self,
        key: &ObjectKey,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError> {
        let sql = if upsert {
            r"
                INSERT INTO objects (bucket, path, content_type, bytes, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(bucket, path) DO UPDATE SET
                    content_type = excluded.content_type,
                    bytes = excluded.bytes,
                    updated_at = excluded.updated_at
            "
        } else {
            r"
                INSERT INTO objects (bucket, path, content_type, bytes, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
            "
        };

        sqlx::query(sql)
            .bind(&key.bucket)
            .bind(&key.path)
            .bind(content_type)
            .bind(bytes)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
                other => conn(other),
            })?;

        Ok(())
    }

    async fn get_object(&self, key: &ObjectKey) -> Result<StoredObject, StorageError> {
        let row = sqlx::query(
            r"
                SELECT content_type, bytes
                FROM objects
                WHERE bucket = ?1 AND path = ?2
            ",
        )
        .bind(&key.bucket)
        .bind(&key.path)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        Ok(StoredObject {
            bytes: row.try_get("bytes").map_err(ser)?,
            content_type: row.try_get("content_type").map_err(ser)?,
        })
    }

    fn public_url(&self, key: &ObjectKey) -> Result<Url, StorageError> {
        join_public_url(&self.public_base, key)
    }
}
