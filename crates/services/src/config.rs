use quiz_core::timer::DEFAULT_QUESTION_SECS;

pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;

pub const QUESTION_SECS_VAR: &str = "QUIZ_QUESTION_SECS";
pub const LEADERBOARD_LIMIT_VAR: &str = "QUIZ_LEADERBOARD_LIMIT";

/// Tunables shared by the quiz and leaderboard services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizConfig {
    pub question_secs: u32,
    pub leaderboard_limit: u32,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_secs: DEFAULT_QUESTION_SECS,
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
        }
    }
}

impl QuizConfig {
    /// Defaults overridden by `QUIZ_QUESTION_SECS` and `QUIZ_LEADERBOARD_LIMIT`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing, zero or unparsable values keep the default.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            question_secs: positive(lookup(QUESTION_SECS_VAR), QUESTION_SECS_VAR)
                .unwrap_or(defaults.question_secs),
            leaderboard_limit: positive(lookup(LEADERBOARD_LIMIT_VAR), LEADERBOARD_LIMIT_VAR)
                .unwrap_or(defaults.leaderboard_limit),
        }
    }

    #[must_use]
    pub fn with_question_secs(mut self, secs: u32) -> Self {
        if secs > 0 {
            self.question_secs = secs;
        }
        self
    }
}

fn positive(raw: Option<String>, key: &str) -> Option<u32> {
    let raw = raw?;
    match raw.trim().parse::<u32>() {
        Ok(v) if v > 0 => Some(v),
        _ => {
            tracing::debug!(key, value = %raw, "ignoring invalid config value");
            None
        }
    }
}
