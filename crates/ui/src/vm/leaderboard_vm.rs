use url::Url;

use quiz_core::model::{UserId, percentage};
use services::{LeaderboardFilter, LeaderboardService};
use storage::repository::LeaderboardRow;

use super::time_fmt::{format_datetime, format_elapsed};
use crate::state::ViewError;

/// Podium places get a badge; everyone else shows their number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankBadge {
    Gold,
    Silver,
    Bronze,
    Number(usize),
}

impl RankBadge {
    #[must_use]
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            1 => RankBadge::Gold,
            2 => RankBadge::Silver,
            3 => RankBadge::Bronze,
            n => RankBadge::Number(n),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardEntryVm {
    pub rank: usize,
    pub badge: RankBadge,
    pub user_id: UserId,
    pub username: String,
    pub avatar_url: Option<Url>,
    pub topic_label: &'static str,
    pub difficulty_label: &'static str,
    pub score_label: String,
    pub percent: u32,
    pub time_label: String,
    pub completed_label: String,
}

#[must_use]
pub fn map_leaderboard(rows: &[LeaderboardRow]) -> Vec<LeaderboardEntryVm> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| LeaderboardEntryVm {
            rank: index + 1,
            badge: RankBadge::for_rank(index + 1),
            user_id: row.user_id,
            username: row.username.as_str().to_owned(),
            avatar_url: row.avatar_url.clone(),
            topic_label: row.selection.topic.label(),
            difficulty_label: row.selection.difficulty.label(),
            score_label: format!("{}/{}", row.score, row.total_questions),
            percent: percentage(row.score, row.total_questions),
            time_label: format_elapsed(row.time_taken_secs),
            completed_label: format_datetime(row.completed_at),
        })
        .collect()
}

/// Tab caption for a filter.
#[must_use]
pub fn filter_label(filter: LeaderboardFilter) -> &'static str {
    match filter {
        LeaderboardFilter::All => "All Topics",
        LeaderboardFilter::Topic(topic) => topic.label(),
    }
}

/// # Errors
///
/// Returns `ViewError::Unknown` if the leaderboard cannot be read.
pub async fn load_leaderboard(
    service: &LeaderboardService,
    filter: LeaderboardFilter,
) -> Result<Vec<LeaderboardEntryVm>, ViewError> {
    let rows = service.top(filter).await.map_err(|_| ViewError::Unknown)?;
    Ok(map_leaderboard(&rows))
}
