use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{Profile, QuizResult, QuizSelection, Topic, UserId, Username};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use url::Url;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Write shape for a finished quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResultRecord {
    pub user_id: UserId,
    pub selection: QuizSelection,
    pub score: u32,
    pub total_questions: u32,
    pub time_taken_secs: u32,
    pub completed_at: DateTime<Utc>,
}

impl NewResultRecord {
    #[must_use]
    pub fn from_result(user_id: UserId, result: &QuizResult) -> Self {
        Self {
            user_id,
            selection: result.selection(),
            score: result.score(),
            total_questions: result.total(),
            time_taken_secs: result.time_taken_secs(),
            completed_at: result.completed_at(),
        }
    }
}

/// Persisted quiz result with its storage id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub id: i64,
    pub user_id: UserId,
    pub selection: QuizSelection,
    pub score: u32,
    pub total_questions: u32,
    pub time_taken_secs: u32,
    pub completed_at: DateTime<Utc>,
}

impl ResultRecord {
    fn from_new(id: i64, record: &NewResultRecord) -> Self {
        Self {
            id,
            user_id: record.user_id,
            selection: record.selection,
            score: record.score,
            total_questions: record.total_questions,
            time_taken_secs: record.time_taken_secs,
            completed_at: record.completed_at,
        }
    }
}

/// A result joined with the owner's profile, as shown on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub id: i64,
    pub user_id: UserId,
    pub username: Username,
    pub avatar_url: Option<Url>,
    pub selection: QuizSelection,
    pub score: u32,
    pub total_questions: u32,
    pub time_taken_secs: u32,
    pub completed_at: DateTime<Utc>,
}

/// Leaderboard ordering: score descending, then time ascending, then id ascending.
#[must_use]
pub fn leaderboard_order(a: &ResultRecord, b: &ResultRecord) -> Ordering {
    b.score
        .cmp(&a.score)
        .then(a.time_taken_secs.cmp(&b.time_taken_secs))
        .then(a.id.cmp(&b.id))
}

/// Location of a stored object: `<bucket>/<path>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    pub bucket: String,
    pub path: String,
}

impl ObjectKey {
    #[must_use]
    pub fn new(bucket: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            path: path.into(),
        }
    }

    #[must_use]
    pub fn joined(&self) -> String {
        format!("{}/{}", self.bucket, self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// Durable record of finished quizzes.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Append a finished quiz, returning its storage id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn append_result(&self, record: &NewResultRecord) -> Result<i64, StorageError>;

    /// Fetch a result by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_result(&self, id: i64) -> Result<ResultRecord, StorageError>;

    /// Most recent results for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failures.
    async fn results_for_user(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<ResultRecord>, StorageError>;
}

#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Top results, ordered by score descending then time ascending.
    ///
    /// Results whose owner has no profile are excluded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failures.
    async fn top_results(
        &self,
        topic: Option<Topic>,
        limit: u32,
    ) -> Result<Vec<LeaderboardRow>, StorageError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on query failures.
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StorageError>;

    /// Persist or update a profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StorageError>;
}

/// Blob storage for uploads such as avatars.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the key exists and `upsert` is false.
    async fn put_object(
        &self,
        key: &ObjectKey,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn get_object(&self, key: &ObjectKey) -> Result<StoredObject, StorageError>;

    /// Public URL for `key`. Does not check existence.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the key cannot form a URL.
    fn public_url(&self, key: &ObjectKey) -> Result<Url, StorageError>;
}

pub(crate) fn join_public_url(base: &Url, key: &ObjectKey) -> Result<Url, StorageError> {
    base.join(&key.joined())
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone)]
pub struct InMemoryRepository {
    results: Arc<Mutex<Vec<ResultRecord>>>,
    profiles: Arc<Mutex<HashMap<UserId, Profile>>>,
    objects: Arc<Mutex<HashMap<ObjectKey, StoredObject>>>,
    public_base: Url,
}

impl InMemoryRepository {
    /// # Panics
    ///
    /// Panics if the built-in public base URL fails to parse (it is a constant).
    #[must_use]
    pub fn new() -> Self {
        Self::with_public_base(
            Url::parse("memory://objects/").expect("constant base url should parse"),
        )
    }

    #[must_use]
    pub fn with_public_base(public_base: Url) -> Self {
        Self {
            results: Arc::new(Mutex::new(Vec::new())),
            profiles: Arc::new(Mutex::new(HashMap::new())),
            objects: Arc::new(Mutex::new(HashMap::new())),
            public_base,
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ResultRepository for InMemoryRepository {
    async fn append_result(&self, record: &NewResultRecord) -> Result<i64, StorageError> {
        let mut guard = self.results.lock().map_err(poisoned)?;
        let id = i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("result id overflow".into()))?
            + 1;
        guard.push(ResultRecord::from_new(id, record));
        Ok(id)
    }

    async fn get_result(&self, id: i64) -> Result<ResultRecord, StorageError> {
        let guard = self.results.lock().map_err(poisoned)?;
        guard
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn results_for_user(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<ResultRecord>, StorageError> {
        let guard = self.results.lock().map_err(poisoned)?;
        let mut rows: Vec<_> = guard.iter().filter(|r| r.user_id == user_id).cloned().collect();
        rows.sort_by(|a, b| b.completed_at.cmp(&a.completed_at).then(b.id.cmp(&a.id)));
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

#[async_trait]
impl LeaderboardRepository for InMemoryRepository {
    async fn top_results(
        &self,
        topic: Option<Topic>,
        limit: u32,
    ) -> Result<Vec<LeaderboardRow>, StorageError> {
        let mut results: Vec<ResultRecord> = {
            let guard = self.results.lock().map_err(poisoned)?;
            guard
                .iter()
                .filter(|r| topic.is_none_or(|t| r.selection.topic == t))
                .cloned()
                .collect()
        };
        results.sort_by(leaderboard_order);

        let profiles = self.profiles.lock().map_err(poisoned)?;
        let rows = results
            .into_iter()
            .filter_map(|r| {
                let profile = profiles.get(&r.user_id)?;
                Some(LeaderboardRow {
                    id: r.id,
                    user_id: r.user_id,
                    username: profile.username.clone(),
                    avatar_url: profile.avatar_url.clone(),
                    selection: r.selection,
                    score: r.score,
                    total_questions: r.total_questions,
                    time_taken_secs: r.time_taken_secs,
                    completed_at: r.completed_at,
                })
            })
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();
        Ok(rows)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StorageError> {
        let guard = self.profiles.lock().map_err(poisoned)?;
        Ok(guard.get(&user_id).cloned())
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        let mut guard = self.profiles.lock().map_err(poisoned)?;
        guard.insert(profile.user_id, profile.clone());
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for InMemoryRepository {
    async fn put_object(
        &self,
        key: &ObjectKey,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError> {
        let mut guard = self.objects.lock().map_err(poisoned)?;
        if !upsert && guard.contains_key(key) {
            return Err(StorageError::Conflict);
        }
        guard.insert(
            key.clone(),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_owned(),
            },
        );
        Ok(())
    }

    async fn get_object(&self, key: &ObjectKey) -> Result<StoredObject, StorageError> {
        let guard = self.objects.lock().map_err(poisoned)?;
        guard.get(key).cloned().ok_or(StorageError::NotFound)
    }

    fn public_url(&self, key: &ObjectKey) -> Result<Url, StorageError> {
        join_public_url(&self.public_base, key)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub results: Arc<dyn ResultRepository>,
    pub leaderboard: Arc<dyn LeaderboardRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub objects: Arc<dyn ObjectStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Use one repository value for every contract.
    #[must_use]
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: ResultRepository
            + LeaderboardRepository
            + ProfileRepository
            + ObjectStore
            + Clone
            + 'static,
    {
        let results: Arc<dyn ResultRepository> = Arc::new(repo.clone());
        let leaderboard: Arc<dyn LeaderboardRepository> = Arc::new(repo.clone());
        let profiles: Arc<dyn ProfileRepository> = Arc::new(repo.clone());
        let objects: Arc<dyn ObjectStore> = Arc::new(repo);
        Self {
            results,
            leaderboard,
            profiles,
            objects,
        }
    }
}
