use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::selector::{Difficulty, Topic};

/// Every question offers exactly this many options.
pub const OPTION_COUNT: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question must have exactly {OPTION_COUNT} options, got {0}")]
    WrongOptionCount(usize),

    #[error("option {0} text cannot be empty")]
    EmptyOption(usize),

    #[error("option index {0} is out of range")]
    OptionOutOfRange(usize),

    #[error("`mixed` is a selector, not a question difficulty")]
    MixedTag,
}

//
// ─── OPTION INDEX ──────────────────────────────────────────────────────────────
//

/// Index of one of the four options of a question (always `0..4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct OptionIndex(u8);

impl OptionIndex {
    /// # Errors
    ///
    /// Returns `QuestionError::OptionOutOfRange` if `index >= 4`.
    pub fn new(index: usize) -> Result<Self, QuestionError> {
        if index >= OPTION_COUNT {
            return Err(QuestionError::OptionOutOfRange(index));
        }
        u8::try_from(index)
            .map(Self)
            .map_err(|_| QuestionError::OptionOutOfRange(index))
    }

    #[must_use]
    pub fn get(self) -> usize {
        usize::from(self.0)
    }
}

impl TryFrom<u8> for OptionIndex {
    type Error = QuestionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(usize::from(value))
    }
}

impl From<OptionIndex> for u8 {
    fn from(value: OptionIndex) -> Self {
        value.0
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: [String; OPTION_COUNT],
    correct: OptionIndex,
    explanation: Option<String>,
    difficulty: Difficulty,
    topic: Topic,
}

impl Question {
    /// Validate and build a question.
    ///
    /// # Errors
    ///
    /// - `EmptyPrompt` if the prompt is blank
    /// - `WrongOptionCount` unless exactly four options are given
    /// - `EmptyOption` if any option is blank
    /// - `OptionOutOfRange` if `correct >= 4`
    /// - `MixedTag` if tagged with `Difficulty::Mixed`
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct: usize,
        explanation: Option<String>,
        difficulty: Difficulty,
        topic: Topic,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if difficulty == Difficulty::Mixed {
            return Err(QuestionError::MixedTag);
        }
        let count = options.len();
        let options: [String; OPTION_COUNT] = options
            .try_into()
            .map_err(|_| QuestionError::WrongOptionCount(count))?;
        if let Some(pos) = options.iter().position(|o| o.trim().is_empty()) {
            return Err(QuestionError::EmptyOption(pos));
        }
        let correct = OptionIndex::new(correct)?;
        let explanation = explanation.filter(|e| !e.trim().is_empty());

        Ok(Self {
            id,
            prompt,
            options,
            correct,
            explanation,
            difficulty,
            topic,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, index: OptionIndex) -> &str {
        &self.options[index.get()]
    }

    #[must_use]
    pub fn correct(&self) -> OptionIndex {
        self.correct
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn topic(&self) -> Topic {
        self.topic
    }

    #[must_use]
    pub fn is_correct(&self, index: OptionIndex) -> bool {
        self.correct == index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        ["a", "b", "c", "d"].map(String::from).to_vec()
    }

    fn build(options: Vec<String>, correct: usize, difficulty: Difficulty) -> Result<Question, QuestionError> {
        Question::new(
            QuestionId::new(1),
            "Pick one",
            options,
            correct,
            None,
            difficulty,
            Topic::Math,
        )
    }

    #[test]
    fn valid_question_builds() {
        let q = build(options(), 2, Difficulty::Normal).unwrap();
        assert_eq!(q.correct().get(), 2);
        assert_eq!(q.option(q.correct()), "c");
        assert!(q.is_correct(OptionIndex::new(2).unwrap()));
        assert!(!q.is_correct(OptionIndex::new(0).unwrap()));
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!(
            build(options()[..3].to_vec(), 0, Difficulty::Normal).unwrap_err(),
            QuestionError::WrongOptionCount(3)
        );
        assert_eq!(
            build(options(), 4, Difficulty::Normal).unwrap_err(),
            QuestionError::OptionOutOfRange(4)
        );
        assert_eq!(
            build(options(), 0, Difficulty::Mixed).unwrap_err(),
            QuestionError::MixedTag
        );

        let mut blank = options();
        blank[1] = "  ".into();
        assert_eq!(
            build(blank, 0, Difficulty::Normal).unwrap_err(),
            QuestionError::EmptyOption(1)
        );
    }

    #[test]
    fn option_index_bounds() {
        assert!(OptionIndex::new(3).is_ok());
        assert_eq!(
            OptionIndex::new(4).unwrap_err(),
            QuestionError::OptionOutOfRange(4)
        );
        assert!(OptionIndex::try_from(9_u8).is_err());
    }

    #[test]
    fn blank_explanation_is_dropped() {
        let q = Question::new(
            QuestionId::new(2),
            "Q",
            options(),
            0,
            Some(" ".into()),
            Difficulty::Hard,
            Topic::Gk,
        )
        .unwrap();
        assert_eq!(q.explanation(), None);
    }
}
