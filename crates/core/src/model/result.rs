use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::selector::{QuizSelection, Topic, Difficulty};
use crate::time::whole_seconds_between;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("a result needs at least one question")]
    NoQuestions,

    #[error("score ({score}) exceeds total questions ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },

    #[error("too many questions for a single quiz: {len}")]
    TooManyQuestions { len: usize },
}

/// Outcome of a submitted quiz run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    selection: QuizSelection,
    score: u32,
    total: u32,
    time_taken_secs: u32,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl QuizResult {
    /// Build the result of a run that just finished.
    ///
    /// # Errors
    ///
    /// Returns `ResultError` if the counts or timestamps are inconsistent.
    pub fn completed(
        selection: QuizSelection,
        score: u32,
        total: usize,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, ResultError> {
        let total =
            u32::try_from(total).map_err(|_| ResultError::TooManyQuestions { len: total })?;
        if completed_at < started_at {
            return Err(ResultError::InvalidTimeRange);
        }
        let time_taken_secs = whole_seconds_between(started_at, completed_at);
        Self::from_persisted(selection, score, total, time_taken_secs, started_at, completed_at)
    }

    /// Rehydrate a result from persisted storage or a handoff.
    ///
    /// # Errors
    ///
    /// Returns `ResultError` if `score > total`, `total == 0`, or the time range is inverted.
    pub fn from_persisted(
        selection: QuizSelection,
        score: u32,
        total: u32,
        time_taken_secs: u32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, ResultError> {
        if completed_at < started_at {
            return Err(ResultError::InvalidTimeRange);
        }
        if total == 0 {
            return Err(ResultError::NoQuestions);
        }
        if score > total {
            return Err(ResultError::ScoreExceedsTotal { score, total });
        }

        Ok(Self {
            selection,
            score,
            total,
            time_taken_secs,
            started_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn selection(&self) -> QuizSelection {
        self.selection
    }

    #[must_use]
    pub fn topic(&self) -> Topic {
        self.selection.topic
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.selection.difficulty
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn time_taken_secs(&self) -> u32 {
        self.time_taken_secs
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Score as a whole percentage, rounded half away from zero.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total)
    }
}

/// Rounded percentage of `score` out of `total`; zero when `total` is zero.
#[must_use]
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let scaled = u64::from(score) * 200 + u64::from(total);
    u32::try_from(scaled / (2 * u64::from(total))).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn selection() -> QuizSelection {
        QuizSelection::new(Difficulty::Normal, Topic::Math)
    }

    #[test]
    fn completed_floors_elapsed_seconds() {
        let start = fixed_now();
        let end = start + Duration::milliseconds(12_900);
        let result = QuizResult::completed(selection(), 2, 3, start, end).unwrap();
        assert_eq!(result.time_taken_secs(), 12);
        assert_eq!(result.total(), 3);
    }

    #[test]
    fn rejects_inconsistent_values() {
        let now = fixed_now();
        assert_eq!(
            QuizResult::from_persisted(selection(), 4, 3, 0, now, now).unwrap_err(),
            ResultError::ScoreExceedsTotal { score: 4, total: 3 }
        );
        assert_eq!(
            QuizResult::from_persisted(selection(), 0, 0, 0, now, now).unwrap_err(),
            ResultError::NoQuestions
        );
        assert_eq!(
            QuizResult::completed(selection(), 0, 1, now, now - Duration::seconds(1)).unwrap_err(),
            ResultError::InvalidTimeRange
        );
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(7, 7), 100);
    }
}
