use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;
use url::Url;

use crate::repository::{
    LeaderboardRepository, ObjectStore, ProfileRepository, ResultRepository, Storage,
};

mod mapping;
mod migrate;
mod object_repo;
mod profile_repo;
mod result_repo;

/// Base used for object URLs when none is configured.
pub const DEFAULT_PUBLIC_BASE: &str = "http://localhost/storage/v1/object/public/";

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
    public_base: Url,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("invalid public object url: {0}")]
    PublicBase(#[from] url::ParseError),
}

impl SqliteRepository {
    /// Connect to `SQLite` using the given URL.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established or if
    /// setting the connection pragmas fails.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA foreign_keys = ON;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA journal_mode = WAL;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self {
            pool,
            public_base: Url::parse(DEFAULT_PUBLIC_BASE)?,
        })
    }

    /// Replace the base URL that object paths are resolved against.
    #[must_use]
    pub fn with_public_base(mut self, public_base: Url) -> Self {
        self.public_base = public_base;
        self
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Build a `Storage` backed by `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        let results: Arc<dyn ResultRepository> = Arc::new(repo.clone());
        let leaderboard: Arc<dyn LeaderboardRepository> = Arc::new(repo.clone());
        let profiles: Arc<dyn ProfileRepository> = Arc::new(repo.clone());
        let objects: Arc<dyn ObjectStore> = Arc::new(repo);
        Ok(Self {
            results,
            leaderboard,
            profiles,
            objects,
        })
    }
}
