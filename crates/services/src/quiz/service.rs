use std::sync::Arc;

use tokio::task::JoinHandle;

use quiz_core::model::{AnswerSheet, Difficulty, QuizResult, QuizSelection, Topic};
use quiz_core::{Countdown, QuestionBank, QuizSession};
use storage::repository::{NewResultRecord, ResultRepository};

use super::runner::{QuizRunner, QuizRunnerHandle};
use crate::Clock;
use crate::config::QuizConfig;
use crate::error::QuizServiceError;
use crate::handoff::{ResultHandoff, ResultTicket};
use crate::identity::Identity;

/// Outcome of the background save that follows a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistStatus {
    Saved(i64),
    /// No signed-in user; nothing was written.
    Skipped,
    /// The save failed. Shown as a non-blocking notice; never retried.
    Failed(String),
}

impl PersistStatus {
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        match self {
            PersistStatus::Failed(message) => Some(message),
            PersistStatus::Saved(_) | PersistStatus::Skipped => None,
        }
    }
}

/// Everything that has to happen once a run is submitted.
#[derive(Clone)]
pub(crate) struct Submission {
    identity: Arc<dyn Identity>,
    results: Arc<dyn ResultRepository>,
    handoff: ResultHandoff,
}

impl Submission {
    /// Stash the ticket for the result screen and start the save.
    ///
    /// The save runs on its own task; the returned handle may be ignored.
    pub(crate) fn finish(
        &self,
        result: &QuizResult,
        answers: &AnswerSheet,
    ) -> (ResultTicket, JoinHandle<PersistStatus>) {
        let ticket = ResultTicket::new(result, answers);
        if let Err(err) = self.handoff.stash(&ticket) {
            tracing::warn!(error = %err, "could not stash quiz result for the result screen");
        }

        let identity = Arc::clone(&self.identity);
        let results = Arc::clone(&self.results);
        let result = result.clone();
        let persist = tokio::spawn(async move {
            persist_result(identity.as_ref(), results.as_ref(), &result).await
        });
        (ticket, persist)
    }
}

/// Append `result` for the signed-in user.
pub(crate) async fn persist_result(
    identity: &dyn Identity,
    results: &dyn ResultRepository,
    result: &QuizResult,
) -> PersistStatus {
    let Some(user) = identity.current_user() else {
        tracing::debug!("no signed-in user; quiz result not saved");
        return PersistStatus::Skipped;
    };

    match results
        .append_result(&NewResultRecord::from_result(user, result))
        .await
    {
        Ok(id) => {
            tracing::info!(
                %user,
                id,
                score = result.score(),
                total = result.total(),
                "quiz result saved"
            );
            PersistStatus::Saved(id)
        }
        Err(err) => {
            tracing::warn!(%user, error = %err, "failed to save quiz result");
            PersistStatus::Failed(err.to_string())
        }
    }
}

/// Starts quiz runs and records their results.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    bank: Arc<QuestionBank>,
    config: QuizConfig,
    submission: Submission,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        bank: Arc<QuestionBank>,
        identity: Arc<dyn Identity>,
        results: Arc<dyn ResultRepository>,
    ) -> Self {
        Self {
            clock,
            bank,
            config: QuizConfig::default(),
            submission: Submission {
                identity,
                results,
                handoff: ResultHandoff::default(),
            },
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: QuizConfig) -> Self {
        self.config = config;
        self
    }

    /// Share a handoff with the result screen.
    #[must_use]
    pub fn with_handoff(mut self, handoff: ResultHandoff) -> Self {
        self.submission.handoff = handoff;
        self
    }

    #[must_use]
    pub fn handoff(&self) -> &ResultHandoff {
        &self.submission.handoff
    }

    #[must_use]
    pub fn config(&self) -> QuizConfig {
        self.config
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Resolve raw navigation parameters, falling back to `normal` / `math`.
    #[must_use]
    pub fn resolve_selection(difficulty: Option<&str>, topic: Option<&str>) -> QuizSelection {
        let selection = QuizSelection::from_params(difficulty, topic);
        if let Some(raw) = difficulty.filter(|raw| raw.parse::<Difficulty>().is_err()) {
            tracing::debug!(raw, fallback = %selection.difficulty, "unknown difficulty");
        }
        if let Some(raw) = topic.filter(|raw| raw.parse::<Topic>().is_err()) {
            tracing::debug!(raw, fallback = %selection.topic, "unknown topic");
        }
        selection
    }

    /// Build a fresh session for `selection`, started now.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Empty` when no question matches.
    pub fn new_session(&self, selection: QuizSelection) -> Result<QuizSession, QuizServiceError> {
        let session = QuizSession::from_bank(&self.bank, selection, self.clock.now())?;
        tracing::debug!(
            difficulty = %selection.difficulty,
            topic = %selection.topic,
            questions = session.len(),
            "quiz session created"
        );
        Ok(session)
    }

    /// Start a timed run on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Empty` when no question matches; the runner is not started.
    pub fn start(&self, selection: QuizSelection) -> Result<QuizRunnerHandle, QuizServiceError> {
        let session = self.new_session(selection)?;
        let countdown = Countdown::new(self.config.question_secs)?;
        Ok(QuizRunner::spawn(
            session,
            countdown,
            self.clock,
            self.submission.clone(),
        ))
    }

    /// Submit `session` without a runner and wait for the save.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadySubmitted` if the session was already submitted.
    pub async fn submit(
        &self,
        session: &mut QuizSession,
    ) -> Result<(QuizResult, PersistStatus), QuizServiceError> {
        let result = session.submit(self.clock.now())?;
        tracing::info!(score = result.score(), total = result.total(), "quiz submitted");
        let (_ticket, persist) = self.submission.finish(&result, session.answers());
        let status = persist
            .await
            .unwrap_or_else(|err| PersistStatus::Failed(err.to_string()));
        Ok((result, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::LocalIdentity;
    use quiz_core::QuizError;
    use quiz_core::model::UserId;
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn service(identity: LocalIdentity, repo: &InMemoryRepository) -> QuizService {
        QuizService::new(
            Clock::fixed(fixed_now()),
            Arc::new(QuestionBank::try_builtin().unwrap()),
            Arc::new(identity),
            Arc::new(repo.clone()),
        )
    }

    #[test]
    fn unknown_params_fall_back_to_defaults() {
        let selection = QuizService::resolve_selection(Some("extreme"), None);
        assert_eq!(selection, QuizSelection::new(Difficulty::Normal, Topic::Math));

        let selection = QuizService::resolve_selection(Some("hard"), Some("gk"));
        assert_eq!(selection, QuizSelection::new(Difficulty::Hard, Topic::Gk));
    }

    #[test]
    fn empty_bank_never_starts_a_session() {
        let svc = QuizService::new(
            Clock::fixed(fixed_now()),
            Arc::new(QuestionBank::new(Vec::new()).unwrap()),
            Arc::new(LocalIdentity::new()),
            Arc::new(InMemoryRepository::new()),
        );
        let err = svc
            .new_session(QuizSelection::default())
            .unwrap_err();
        assert!(matches!(err, QuizServiceError::Quiz(QuizError::Empty)));
    }

    #[tokio::test]
    async fn submit_saves_for_signed_in_user_and_stashes_ticket() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let svc = service(LocalIdentity::signed_in(user), &repo);

        let mut session = svc.new_session(QuizSelection::default()).unwrap();
        session.select_option(1).unwrap();
        let (result, status) = svc.submit(&mut session).await.unwrap();

        assert_eq!(result.score(), 1);
        let PersistStatus::Saved(id) = status else {
            panic!("expected saved, got {status:?}");
        };
        let stored = repo.get_result(id).await.unwrap();
        assert_eq!(stored.user_id, user);
        assert_eq!(stored.score, 1);
        assert_eq!(stored.total_questions, 3);

        let ticket = svc.handoff().peek().unwrap().unwrap();
        assert_eq!(ticket.score, 1);
        assert_eq!(ticket.total, 3);
    }

    #[tokio::test]
    async fn submit_without_user_skips_persistence() {
        let repo = InMemoryRepository::new();
        let svc = service(LocalIdentity::new(), &repo);
        let mut session = svc.new_session(QuizSelection::default()).unwrap();
        let (_, status) = svc.submit(&mut session).await.unwrap();
        assert_eq!(status, PersistStatus::Skipped);
        assert!(matches!(
            svc.submit(&mut session).await,
            Err(QuizServiceError::Quiz(QuizError::AlreadySubmitted))
        ));
    }
}
