//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::ProfileError;
use quiz_core::{BankError, QuizError, TimerError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `QuizService` and the quiz runner.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("quiz runner has stopped")]
    RunnerClosed,
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error("no user is signed in")]
    NotSignedIn,
    #[error("profile not found")]
    Missing,
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while seeding demo data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error("invalid demo player name: {0}")]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `LeaderboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LeaderboardError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the result handoff.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HandoffError {
    #[error("tab storage is unavailable")]
    Unavailable,
    #[error(transparent)]
    Encoding(#[from] serde_json::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Timer(#[from] TimerError),
}
