//! Demo data for an empty leaderboard.

use chrono::Duration;
use rand::Rng;
use rand::seq::IndexedRandom;

use quiz_core::model::{Difficulty, Profile, QuizSelection, Topic, UserId, Username};
use quiz_core::timer::DEFAULT_QUESTION_SECS;
use quiz_core::{Clock, QuestionBank};
use storage::repository::{NewResultRecord, ProfileRepository, ResultRepository, Storage};

use crate::error::SeedError;

pub const DEMO_PLAYERS: [&str; 6] = ["ada", "grace", "linus", "margaret", "alan", "barbara"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub profiles: usize,
    pub results: usize,
}

/// Insert a profile per name plus `runs_per_player` random results each.
///
/// Question totals follow the bank so every row is a plausible run.
///
/// # Errors
///
/// Returns `SeedError::Profile` for an invalid player name and
/// `SeedError::Storage` if a write fails; earlier writes are kept.
pub async fn seed_demo<R: Rng>(
    storage: &Storage,
    bank: &QuestionBank,
    clock: Clock,
    rng: &mut R,
    players: &[&str],
    runs_per_player: u32,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();
    let difficulties = Difficulty::ALL;

    for name in players {
        let username = Username::new(name)?;
        let user = UserId::random();
        storage
            .profiles
            .upsert_profile(&Profile::new(user, username))
            .await?;
        report.profiles += 1;

        for _ in 0..runs_per_player {
            let topic = *Topic::ALL.choose(rng).unwrap_or(&Topic::Math);
            let difficulty = *difficulties.choose(rng).unwrap_or(&Difficulty::Normal);
            let total = u32::try_from(bank.filter(difficulty, Some(topic)).len()).unwrap_or(0);
            if total == 0 {
                continue;
            }
            let score = rng.random_range(0..=total);
            let time_taken_secs = rng.random_range(total..=total * DEFAULT_QUESTION_SECS);
            let completed_at = clock.now() - Duration::minutes(rng.random_range(0..60 * 24 * 7));

            storage
                .results
                .append_result(&NewResultRecord {
                    user_id: user,
                    selection: QuizSelection::new(difficulty, topic),
                    score,
                    total_questions: total,
                    time_taken_secs,
                    completed_at,
                })
                .await?;
            report.results += 1;
        }
    }

    tracing::info!(
        profiles = report.profiles,
        results = report.results,
        "demo data seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::ProfileError;
    use quiz_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use storage::repository::LeaderboardRepository;

    #[tokio::test]
    async fn seeds_consistent_rows() {
        let storage = Storage::in_memory();
        let mut rng = StdRng::seed_from_u64(7);
        let report = seed_demo(
            &storage,
            &QuestionBank::try_builtin().unwrap(),
            Clock::fixed(fixed_now()),
            &mut rng,
            &DEMO_PLAYERS[..3],
            4,
        )
        .await
        .unwrap();

        assert_eq!(report.profiles, 3);
        assert_eq!(report.results, 12);

        let rows = storage.leaderboard.top_results(None, 50).await.unwrap();
        assert_eq!(rows.len(), 12);
        for row in &rows {
            assert!(row.score <= row.total_questions);
            assert!(row.completed_at <= fixed_now());
        }
        assert!(rows.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn blank_player_name_is_a_profile_error() {
        let storage = Storage::in_memory();
        let mut rng = StdRng::seed_from_u64(7);
        let err = seed_demo(
            &storage,
            &QuestionBank::try_builtin().unwrap(),
            Clock::fixed(fixed_now()),
            &mut rng,
            &["ada", "   "],
            1,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            SeedError::Profile(ProfileError::EmptyUsername)
        ));
        let rows = storage.leaderboard.top_results(None, 50).await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
