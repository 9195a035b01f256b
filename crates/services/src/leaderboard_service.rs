use std::fmt;
use std::sync::Arc;

use quiz_core::model::Topic;
use storage::repository::{LeaderboardRepository, LeaderboardRow};

use crate::config::DEFAULT_LEADERBOARD_LIMIT;
use crate::error::LeaderboardError;

/// Topic tab on the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaderboardFilter {
    #[default]
    All,
    Topic(Topic),
}

impl LeaderboardFilter {
    /// `all` and anything unrecognised select every topic.
    #[must_use]
    pub fn from_param(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse::<Topic>().ok())
            .map_or(Self::All, Self::Topic)
    }

    #[must_use]
    pub fn topic(self) -> Option<Topic> {
        match self {
            Self::All => None,
            Self::Topic(topic) => Some(topic),
        }
    }

    /// Every tab in display order.
    #[must_use]
    pub fn tabs() -> Vec<Self> {
        std::iter::once(Self::All)
            .chain(Topic::ALL.into_iter().map(Self::Topic))
            .collect()
    }
}

impl fmt::Display for LeaderboardFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Topic(topic) => f.write_str(topic.as_str()),
        }
    }
}

/// Reads the top results for a topic tab.
#[derive(Clone)]
pub struct LeaderboardService {
    repo: Arc<dyn LeaderboardRepository>,
    limit: u32,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(repo: Arc<dyn LeaderboardRepository>) -> Self {
        Self {
            repo,
            limit: DEFAULT_LEADERBOARD_LIMIT,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Best results first: score descending, then time ascending.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::Storage` if the query fails.
    pub async fn top(
        &self,
        filter: LeaderboardFilter,
    ) -> Result<Vec<LeaderboardRow>, LeaderboardError> {
        let rows = self.repo.top_results(filter.topic(), self.limit).await?;
        tracing::debug!(%filter, rows = rows.len(), "leaderboard loaded");
        Ok(rows)
    }
}
