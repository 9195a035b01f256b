use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{QuizSelection, Selection, UserId};
use quiz_core::QuestionBank;
use quiz_core::time::fixed_now;
use services::{
    Clock, LocalIdentity, PersistStatus, QuizConfig, QuizService, RunnerOutcome, RunnerPhase,
};
use storage::repository::{InMemoryRepository, ResultRepository};

fn service(repo: &InMemoryRepository, user: UserId, secs: u32) -> QuizService {
    QuizService::new(
        Clock::fixed(fixed_now()),
        Arc::new(QuestionBank::try_builtin().unwrap()),
        Arc::new(LocalIdentity::signed_in(user)),
        Arc::new(repo.clone()),
    )
    .with_config(QuizConfig::default().with_question_secs(secs))
}

#[tokio::test(start_paused = true)]
async fn unattended_run_times_out_every_question() {
    let repo = InMemoryRepository::new();
    let user = UserId::random();
    let svc = service(&repo, user, 30);

    let started = tokio::time::Instant::now();
    let handle = svc.start(QuizSelection::default()).unwrap();
    let RunnerOutcome::Submitted {
        result,
        ticket,
        persist,
    } = handle.outcome().await.unwrap()
    else {
        panic!("timeouts should submit the run");
    };

    assert_eq!(started.elapsed(), Duration::from_secs(90));
    assert_eq!(result.score(), 0);
    assert_eq!(result.total(), 3);
    assert_eq!(ticket.answers.len(), 3);
    assert!(
        ticket
            .answers
            .iter()
            .all(|record| record.selection == Selection::Unanswered)
    );

    let PersistStatus::Saved(id) = persist.await.unwrap() else {
        panic!("result should be saved");
    };
    assert_eq!(repo.get_result(id).await.unwrap().score, 0);
}

#[tokio::test(start_paused = true)]
async fn timeout_keeps_an_existing_selection() {
    let repo = InMemoryRepository::new();
    let svc = service(&repo, UserId::random(), 5);

    let handle = svc.start(QuizSelection::default()).unwrap();
    handle.select(1).await.unwrap();

    let RunnerOutcome::Submitted { result, ticket, .. } = handle.outcome().await.unwrap() else {
        panic!("timeouts should submit the run");
    };
    assert_eq!(result.score(), 1);
    let first = ticket.answers[0];
    assert_eq!(first.selection.chosen().map(|i| i.get()), Some(1));
    assert_eq!(ticket.answers[1].selection, Selection::Unanswered);
}

#[tokio::test(start_paused = true)]
async fn countdown_ticks_and_resets_on_navigation() {
    let repo = InMemoryRepository::new();
    let svc = service(&repo, UserId::random(), 10);
    let mut handle = svc.start(QuizSelection::default()).unwrap();
    let mut snapshots = handle.subscribe();

    let snap = snapshots
        .wait_for(|s| s.remaining_secs == 7)
        .await
        .unwrap()
        .clone();
    assert_eq!(snap.position, 0);

    handle.next().await.unwrap();
    let moved = loop {
        let snap = handle.changed().await.unwrap();
        if snap.position == 1 {
            break snap;
        }
    };
    assert_eq!(moved.remaining_secs, 10);
    assert!(moved.current_selection.is_none());

    handle.previous().await.unwrap();
    let back = loop {
        let snap = handle.changed().await.unwrap();
        if snap.position == 0 {
            break snap;
        }
    };
    assert_eq!(back.remaining_secs, 10);

    handle.abandon().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn paused_countdown_does_not_expire() {
    let repo = InMemoryRepository::new();
    let svc = service(&repo, UserId::random(), 5);
    let handle = svc.start(QuizSelection::default()).unwrap();

    handle.pause().await.unwrap();
    // Land between ticks so the resume cannot race a tick.
    tokio::time::sleep(Duration::from_millis(60_500)).await;

    let snap = handle.snapshot();
    assert!(snap.paused);
    assert_eq!(snap.position, 0);
    assert_eq!(snap.remaining_secs, 5);
    assert_eq!(snap.phase, RunnerPhase::InProgress);

    handle.resume().await.unwrap();
    let started = tokio::time::Instant::now();
    let RunnerOutcome::Submitted { result, .. } = handle.outcome().await.unwrap() else {
        panic!("resumed run should time out");
    };
    assert_eq!(started.elapsed(), Duration::from_millis(14_500));
    assert_eq!(result.score(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_abandons_without_saving() {
    let repo = InMemoryRepository::new();
    let user = UserId::random();
    let svc = service(&repo, user, 5);
    let handle = svc.start(QuizSelection::default()).unwrap();
    let mut snapshots = handle.subscribe();

    handle.select(1).await.unwrap();
    drop(handle);

    let last = snapshots
        .wait_for(|s| s.phase == RunnerPhase::Abandoned)
        .await
        .unwrap()
        .clone();
    assert_eq!(last.phase, RunnerPhase::Abandoned);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(repo.results_for_user(user, 10).await.unwrap().is_empty());
    assert!(svc.handoff().peek().unwrap().is_none());
}
