use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{QuizSelection, Selection, UserId};
use quiz_core::time::fixed_now;
use quiz_core::{QuestionBank, QuizError};
use services::{
    Clock, LocalIdentity, PersistStatus, QuizService, QuizServiceError, RunnerOutcome, RunnerPhase,
};
use storage::repository::{
    InMemoryRepository, NewResultRecord, ResultRecord, ResultRepository, StorageError,
};

struct BrokenResults;

#[async_trait]
impl ResultRepository for BrokenResults {
    async fn append_result(&self, _record: &NewResultRecord) -> Result<i64, StorageError> {
        Err(StorageError::Connection("database is down".into()))
    }

    async fn get_result(&self, _id: i64) -> Result<ResultRecord, StorageError> {
        Err(StorageError::NotFound)
    }

    async fn results_for_user(
        &self,
        _user_id: UserId,
        _limit: u32,
    ) -> Result<Vec<ResultRecord>, StorageError> {
        Ok(Vec::new())
    }
}

fn quiz_service(results: Arc<dyn ResultRepository>, user: Option<UserId>) -> QuizService {
    let identity = user.map_or_else(LocalIdentity::new, LocalIdentity::signed_in);
    QuizService::new(
        Clock::fixed(fixed_now()),
        Arc::new(QuestionBank::try_builtin().unwrap()),
        Arc::new(identity),
        results,
    )
}

#[tokio::test]
async fn perfect_run_is_saved_and_handed_off() {
    let repo = InMemoryRepository::new();
    let user = UserId::random();
    let svc = quiz_service(Arc::new(repo.clone()), Some(user));

    let handle = svc.start(QuizSelection::default()).unwrap();
    // normal math: 12 + 8, 5 × 6, 100 - 37
    for answer in [1, 1, 0] {
        handle.select(answer).await.unwrap();
        handle.next().await.unwrap();
    }

    let RunnerOutcome::Submitted {
        result,
        ticket,
        persist,
    } = handle.outcome().await.unwrap()
    else {
        panic!("run should have been submitted");
    };
    assert_eq!(result.score(), 3);
    assert_eq!(result.total(), 3);
    assert_eq!(ticket.percentage(), 100);

    let PersistStatus::Saved(id) = persist.await.unwrap() else {
        panic!("result should be saved");
    };
    let stored = repo.get_result(id).await.unwrap();
    assert_eq!(stored.user_id, user);
    assert_eq!(stored.score, 3);

    let handed_off = svc.handoff().take().unwrap().unwrap();
    assert_eq!(handed_off, ticket);
    assert!(svc.handoff().peek().unwrap().is_none());
}

#[tokio::test]
async fn reselection_and_back_navigation_keep_latest_answer() {
    let svc = quiz_service(Arc::new(InMemoryRepository::new()), None);
    let mut handle = svc.start(QuizSelection::default()).unwrap();

    handle.select(0).await.unwrap();
    handle.select(3).await.unwrap();
    handle.select(1).await.unwrap();
    handle.next().await.unwrap();
    handle.previous().await.unwrap();
    // Commands are applied in order, so a paused snapshot comes after the retreat.
    handle.pause().await.unwrap();

    let snapshot = loop {
        let snap = handle.changed().await.unwrap();
        if snap.paused {
            break snap;
        }
    };
    assert_eq!(snapshot.position, 0);
    assert_eq!(snapshot.answered, 1);
    assert_eq!(
        snapshot.current_selection.and_then(Selection::chosen).map(|i| i.get()),
        Some(1)
    );

    handle.submit().await.unwrap();
    let RunnerOutcome::Submitted { result, ticket, .. } = handle.outcome().await.unwrap() else {
        panic!("run should have been submitted");
    };
    assert_eq!(result.score(), 1);
    assert_eq!(ticket.answers.len(), 1);
}

#[tokio::test]
async fn settled_waits_for_sent_commands() {
    let svc = quiz_service(Arc::new(InMemoryRepository::new()), None);
    let mut handle = svc.start(QuizSelection::default()).unwrap();

    handle.select(1).await.unwrap();
    handle.next().await.unwrap();
    handle.select(9).await.unwrap();

    let snap = handle.settled().await.unwrap();
    assert_eq!(snap.applied, 3);
    assert_eq!(snap.position, 1);
    assert_eq!(snap.answered, 1);
    assert!(snap.current_selection.is_none());

    handle.abandon().await.unwrap();
}

#[tokio::test]
async fn out_of_range_option_is_ignored() {
    let svc = quiz_service(Arc::new(InMemoryRepository::new()), None);
    let mut handle = svc.start(QuizSelection::default()).unwrap();

    handle.select(4).await.unwrap();
    let snap = handle.changed().await.unwrap();
    assert_eq!(snap.answered, 0);
    assert!(snap.current_selection.is_none());
    assert_eq!(snap.phase, RunnerPhase::InProgress);

    handle.abandon().await.unwrap();
}

#[tokio::test]
async fn persistence_failure_still_shows_result() {
    let svc = quiz_service(Arc::new(BrokenResults), Some(UserId::random()));
    let handle = svc.start(QuizSelection::default()).unwrap();
    let mut snapshots = handle.subscribe();

    handle.select(1).await.unwrap();
    handle.submit().await.unwrap();

    let RunnerOutcome::Submitted {
        result, persist, ..
    } = handle.outcome().await.unwrap()
    else {
        panic!("run should have been submitted");
    };
    let published = snapshots
        .wait_for(|s| s.result().is_some())
        .await
        .unwrap()
        .clone();
    assert_eq!(published.result(), Some(&result));

    let status = persist.await.unwrap();
    assert!(matches!(status, PersistStatus::Failed(_)));
    assert!(status.notice().unwrap().contains("database is down"));
}

#[tokio::test]
async fn anonymous_run_is_not_saved() {
    let repo = InMemoryRepository::new();
    let svc = quiz_service(Arc::new(repo.clone()), None);
    let handle = svc.start(QuizSelection::default()).unwrap();
    handle.submit().await.unwrap();

    let RunnerOutcome::Submitted { persist, .. } = handle.outcome().await.unwrap() else {
        panic!("run should have been submitted");
    };
    assert_eq!(persist.await.unwrap(), PersistStatus::Skipped);
    assert!(matches!(
        repo.get_result(1).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn empty_selection_never_starts_a_runner() {
    let svc = QuizService::new(
        Clock::fixed(fixed_now()),
        Arc::new(QuestionBank::new(Vec::new()).unwrap()),
        Arc::new(LocalIdentity::new()),
        Arc::new(InMemoryRepository::new()),
    );
    assert!(matches!(
        svc.start(QuizSelection::default()),
        Err(QuizServiceError::Quiz(QuizError::Empty))
    ));
}

#[tokio::test]
async fn commands_after_the_run_ends_are_rejected() {
    let svc = quiz_service(Arc::new(InMemoryRepository::new()), None);
    let handle = svc.start(QuizSelection::default()).unwrap();
    let mut snapshots = handle.subscribe();
    handle.submit().await.unwrap();
    snapshots.wait_for(|s| s.result().is_some()).await.unwrap();

    // The runner task has exited and dropped its receiver.
    tokio::task::yield_now().await;
    let mut rejected = false;
    for _ in 0..10 {
        if matches!(handle.next().await, Err(QuizServiceError::RunnerClosed)) {
            rejected = true;
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(rejected);
}
