use chrono::Duration;
use quiz_core::model::{Difficulty, Profile, QuizSelection, Topic, UserId, Username};
use quiz_core::time::fixed_now;
use storage::repository::{
    LeaderboardRepository, NewResultRecord, ObjectKey, ObjectStore, ProfileRepository,
    ResultRepository, Storage, StorageError,
};
use storage::sqlite::SqliteRepository;

async fn open(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn record(user: UserId, topic: Topic, score: u32, secs: u32) -> NewResultRecord {
    NewResultRecord {
        user_id: user,
        selection: QuizSelection::new(Difficulty::Hard, topic),
        score,
        total_questions: 3,
        time_taken_secs: secs,
        completed_at: fixed_now(),
    }
}

async fn profile(repo: &SqliteRepository, name: &str) -> UserId {
    let user = UserId::random();
    repo.upsert_profile(&Profile::new(user, Username::new(name).unwrap()))
        .await
        .unwrap();
    user
}

#[tokio::test]
async fn sqlite_result_roundtrip() {
    let repo = open("memdb_result_roundtrip").await;
    let user = UserId::random();

    let id = repo
        .append_result(&record(user, Topic::Science, 2, 41))
        .await
        .unwrap();
    let fetched = repo.get_result(id).await.unwrap();

    assert_eq!(fetched.user_id, user);
    assert_eq!(fetched.selection.topic, Topic::Science);
    assert_eq!(fetched.selection.difficulty, Difficulty::Hard);
    assert_eq!(fetched.score, 2);
    assert_eq!(fetched.total_questions, 3);
    assert_eq!(fetched.time_taken_secs, 41);
    assert_eq!(fetched.completed_at, fixed_now());

    assert!(matches!(
        repo.get_result(id + 100).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_leaderboard_joins_profiles_and_orders() {
    let repo = open("memdb_leaderboard").await;
    let ada = profile(&repo, "ada").await;
    let bob = profile(&repo, "bob").await;
    let ghost = UserId::random();

    repo.append_result(&record(ada, Topic::Math, 2, 30)).await.unwrap();
    repo.append_result(&record(bob, Topic::Math, 3, 50)).await.unwrap();
    repo.append_result(&record(bob, Topic::Math, 2, 12)).await.unwrap();
    repo.append_result(&record(ghost, Topic::Math, 3, 1)).await.unwrap();
    repo.append_result(&record(ada, Topic::Sports, 3, 5)).await.unwrap();

    let math = repo.top_results(Some(Topic::Math), 10).await.unwrap();
    let order: Vec<(&str, u32, u32)> = math
        .iter()
        .map(|r| (r.username.as_str(), r.score, r.time_taken_secs))
        .collect();
    assert_eq!(
        order,
        vec![("bob", 3, 50), ("bob", 2, 12), ("ada", 2, 30)]
    );

    let all = repo.top_results(None, 2).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].score, 3);
    assert_eq!(all[0].time_taken_secs, 5);
}

#[tokio::test]
async fn sqlite_profile_upsert_updates_in_place() {
    let repo = open("memdb_profiles").await;
    let user = profile(&repo, "first").await;

    let mut updated = repo.get_profile(user).await.unwrap().unwrap();
    updated.username = Username::new("second").unwrap();
    updated.avatar_url = Some("https://cdn.example.com/a.png".parse().unwrap());
    repo.upsert_profile(&updated).await.unwrap();

    let fetched = repo.get_profile(user).await.unwrap().unwrap();
    assert_eq!(fetched, updated);
    assert!(repo.get_profile(UserId::random()).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_objects_conflict_without_upsert() {
    let repo = open("memdb_objects").await;
    let key = ObjectKey::new("avatars", "someone/avatar.png");

    repo.put_object(&key, b"v1", "image/png", false).await.unwrap();
    assert!(matches!(
        repo.put_object(&key, b"v2", "image/png", false).await,
        Err(StorageError::Conflict)
    ));
    repo.put_object(&key, b"v3", "image/webp", true).await.unwrap();

    let stored = repo.get_object(&key).await.unwrap();
    assert_eq!(stored.bytes, b"v3".to_vec());
    assert_eq!(stored.content_type, "image/webp");
    assert!(
        repo.public_url(&key)
            .unwrap()
            .as_str()
            .ends_with("/avatars/someone/avatar.png")
    );
}

#[tokio::test]
async fn sqlite_results_for_user_newest_first() {
    let repo = open("memdb_user_results").await;
    let user = UserId::random();
    let mut old = record(user, Topic::Gk, 1, 9);
    old.completed_at = fixed_now() - Duration::days(1);
    repo.append_result(&old).await.unwrap();
    repo.append_result(&record(user, Topic::Gk, 3, 9)).await.unwrap();
    repo.append_result(&record(UserId::random(), Topic::Gk, 2, 9))
        .await
        .unwrap();

    let rows = repo.results_for_user(user, 10).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].score, 3);
    assert_eq!(rows[1].score, 1);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = open("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    let storage = Storage::sqlite("sqlite:file:memdb_migrate_twice?mode=memory&cache=shared")
        .await
        .expect("storage");
    let user = UserId::random();
    storage
        .results
        .append_result(&record(user, Topic::Math, 1, 1))
        .await
        .unwrap();
}
