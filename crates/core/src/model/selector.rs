use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectorError {
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("unknown topic: {0}")]
    UnknownTopic(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty selector for a quiz run.
///
/// `Mixed` only exists as a selector: it matches every question and is never
/// used to tag a question in the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Normal,
    Medium,
    Hard,
    Mixed,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Normal,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Mixed,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Normal => "normal",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Mixed => "mixed",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Normal => "Normal",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Mixed => "Mixed",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Difficulty::Normal => "Easy questions for beginners",
            Difficulty::Medium => "Moderate challenge",
            Difficulty::Hard => "Expert level questions",
            Difficulty::Mixed => "All difficulty levels",
        }
    }

    /// Whether a question tagged `tag` belongs to a run with this selector.
    #[must_use]
    pub fn matches(self, tag: Difficulty) -> bool {
        self == Difficulty::Mixed || self == tag
    }

    /// Lenient parse used for navigation parameters: unknown or missing values
    /// fall back to `Normal`.
    #[must_use]
    pub fn from_param(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for Difficulty {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Difficulty::Normal),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "mixed" => Ok(Difficulty::Mixed),
            _ => Err(SelectorError::UnknownDifficulty(s.to_owned())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── TOPIC ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    #[default]
    Math,
    Science,
    Sports,
    Gk,
}

impl Topic {
    pub const ALL: [Topic; 4] = [Topic::Math, Topic::Science, Topic::Sports, Topic::Gk];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Math => "math",
            Topic::Science => "science",
            Topic::Sports => "sports",
            Topic::Gk => "gk",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Topic::Math => "Mathematics",
            Topic::Science => "Science",
            Topic::Sports => "Sports",
            Topic::Gk => "General Knowledge",
        }
    }

    /// Lenient parse used for navigation parameters: unknown or missing values
    /// fall back to `Math`.
    #[must_use]
    pub fn from_param(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for Topic {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "math" => Ok(Topic::Math),
            "science" => Ok(Topic::Science),
            "sports" => Ok(Topic::Sports),
            "gk" => Ok(Topic::Gk),
            _ => Err(SelectorError::UnknownTopic(s.to_owned())),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pair of selectors that parameterise a quiz run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QuizSelection {
    pub difficulty: Difficulty,
    pub topic: Topic,
}

impl QuizSelection {
    #[must_use]
    pub fn new(difficulty: Difficulty, topic: Topic) -> Self {
        Self { difficulty, topic }
    }

    /// Builds a selection from raw navigation parameters, defaulting unknown values.
    #[must_use]
    pub fn from_params(difficulty: Option<&str>, topic: Option<&str>) -> Self {
        Self {
            difficulty: Difficulty::from_param(difficulty),
            topic: Topic::from_param(topic),
        }
    }
}
