use std::sync::Arc;

use quiz_core::QuestionBank;
use storage::repository::Storage;

use crate::Clock;
use crate::config::QuizConfig;
use crate::error::AppServicesError;
use crate::handoff::ResultHandoff;
use crate::identity::LocalIdentity;
use crate::leaderboard_service::LeaderboardService;
use crate::profile_service::ProfileService;
use crate::quiz::QuizService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    config: QuizConfig,
    storage: Storage,
    bank: Arc<QuestionBank>,
    identity: LocalIdentity,
    handoff: ResultHandoff,
    quiz: Arc<QuizService>,
    leaderboard: Arc<LeaderboardService>,
    profiles: Arc<ProfileService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// built-in question bank is invalid.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: QuizConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::with_storage(storage, clock, config)
    }

    /// Build services over in-memory storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Bank` if the built-in question bank is invalid.
    pub fn in_memory(clock: Clock, config: QuizConfig) -> Result<Self, AppServicesError> {
        Self::with_storage(Storage::in_memory(), clock, config)
    }

    /// # Errors
    ///
    /// Returns `AppServicesError::Bank` if the built-in question bank is invalid.
    pub fn with_storage(
        storage: Storage,
        clock: Clock,
        config: QuizConfig,
    ) -> Result<Self, AppServicesError> {
        let bank = Arc::new(QuestionBank::try_builtin()?);
        let identity = LocalIdentity::new();
        let handoff = ResultHandoff::default();

        let quiz = Arc::new(
            QuizService::new(
                clock,
                Arc::clone(&bank),
                Arc::new(identity.clone()),
                Arc::clone(&storage.results),
            )
            .with_config(config)
            .with_handoff(handoff.clone()),
        );
        let leaderboard = Arc::new(
            LeaderboardService::new(Arc::clone(&storage.leaderboard))
                .with_limit(config.leaderboard_limit),
        );
        let profiles = Arc::new(ProfileService::new(
            Arc::new(identity.clone()),
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.objects),
            Arc::clone(&storage.results),
        ));

        tracing::debug!(
            questions = bank.len(),
            question_secs = config.question_secs,
            "app services ready"
        );

        Ok(Self {
            clock,
            config,
            storage,
            bank,
            identity,
            handoff,
            quiz,
            leaderboard,
            profiles,
        })
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn config(&self) -> QuizConfig {
        self.config
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn bank(&self) -> Arc<QuestionBank> {
        Arc::clone(&self.bank)
    }

    #[must_use]
    pub fn identity(&self) -> &LocalIdentity {
        &self.identity
    }

    #[must_use]
    pub fn handoff(&self) -> &ResultHandoff {
        &self.handoff
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn leaderboard(&self) -> Arc<LeaderboardService> {
        Arc::clone(&self.leaderboard)
    }

    #[must_use]
    pub fn profiles(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profiles)
    }
}
