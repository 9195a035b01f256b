use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::bank::QuestionBank;
use crate::model::{
    AnswerSheet, OPTION_COUNT, OptionIndex, Question, QuizResult, QuizSelection, ResultError,
    Selection,
};
use crate::scoring::score;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no questions available for this selection")]
    Empty,

    #[error("quiz already submitted")]
    AlreadySubmitted,

    #[error("option {index} is out of range (0..{count})")]
    OptionOutOfRange { index: usize, count: usize },

    #[error(transparent)]
    Result(#[from] ResultError),
}

//
// ─── TRANSITIONS ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizState {
    InProgress { position: usize },
    Submitted(QuizResult),
}

/// Outcome of a navigation operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Moved { position: usize },
    /// Retreat at the first question.
    Stayed,
    Submitted(QuizResult),
}

/// Hook for presentation feedback after a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerFeedback {
    Correct,
    Incorrect,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One run through a fixed, ordered list of questions.
///
/// Mutated only through its operations. Once submitted the session is
/// terminal: every operation returns `QuizError::AlreadySubmitted` and the
/// stored result never changes.
pub struct QuizSession {
    selection: QuizSelection,
    questions: Vec<Question>,
    answers: AnswerSheet,
    started_at: DateTime<Utc>,
    state: QuizState,
}

impl QuizSession {
    /// Start a session over `questions`, which become fixed for the run.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Empty` if `questions` is empty.
    pub fn start(
        selection: QuizSelection,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }
        Ok(Self {
            selection,
            questions,
            answers: AnswerSheet::new(),
            started_at,
            state: QuizState::InProgress { position: 0 },
        })
    }

    /// Filter `bank` by the selection's difficulty and topic, then start.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Empty` if the filter yields nothing.
    pub fn from_bank(
        bank: &QuestionBank,
        selection: QuizSelection,
        started_at: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        let questions = bank.filter(selection.difficulty, Some(selection.topic));
        Self::start(selection, questions, started_at)
    }

    #[must_use]
    pub fn selection(&self) -> QuizSelection {
        self.selection
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn state(&self) -> &QuizState {
        &self.state
    }

    /// Current position, or `None` once submitted.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match self.state {
            QuizState::InProgress { position } => Some(position),
            QuizState::Submitted(_) => None,
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.position().and_then(|p| self.questions.get(p))
    }

    /// Selection previously recorded for the current question, used to restore
    /// it when the user navigates back.
    #[must_use]
    pub fn current_selection(&self) -> Option<Selection> {
        self.current_question()
            .and_then(|q| self.answers.get(q.id()))
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.position() == Some(self.questions.len() - 1)
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        matches!(self.state, QuizState::Submitted(_))
    }

    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        match &self.state {
            QuizState::Submitted(result) => Some(result),
            QuizState::InProgress { .. } => None,
        }
    }

    fn in_progress(&self) -> Result<usize, QuizError> {
        self.position().ok_or(QuizError::AlreadySubmitted)
    }

    /// Record `index` for the current question, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// - `AlreadySubmitted` after submission
    /// - `OptionOutOfRange` if `index >= 4`; the answer sheet is left untouched
    pub fn select_option(&mut self, index: usize) -> Result<AnswerFeedback, QuizError> {
        let position = self.in_progress()?;
        let chosen = OptionIndex::new(index).map_err(|_| QuizError::OptionOutOfRange {
            index,
            count: OPTION_COUNT,
        })?;
        let question = &self.questions[position];
        let feedback = if question.is_correct(chosen) {
            AnswerFeedback::Correct
        } else {
            AnswerFeedback::Incorrect
        };
        self.answers.upsert(question.id(), Selection::Chosen(chosen));
        Ok(feedback)
    }

    /// Move to the next question, or submit when on the last one.
    ///
    /// # Errors
    ///
    /// Returns `AlreadySubmitted` after submission.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Step, QuizError> {
        let position = self.in_progress()?;
        if position + 1 >= self.questions.len() {
            return self.submit(now).map(Step::Submitted);
        }
        let position = position + 1;
        self.state = QuizState::InProgress { position };
        Ok(Step::Moved { position })
    }

    /// Move to the previous question; a no-op on the first.
    ///
    /// # Errors
    ///
    /// Returns `AlreadySubmitted` after submission.
    pub fn retreat(&mut self) -> Result<Step, QuizError> {
        let position = self.in_progress()?;
        if position == 0 {
            return Ok(Step::Stayed);
        }
        let position = position - 1;
        self.state = QuizState::InProgress { position };
        Ok(Step::Moved { position })
    }

    /// The countdown for the current question ran out.
    ///
    /// Records `Unanswered` if nothing was chosen yet, then advances.
    ///
    /// # Errors
    ///
    /// Returns `AlreadySubmitted` after submission.
    pub fn time_expire(&mut self, now: DateTime<Utc>) -> Result<Step, QuizError> {
        let position = self.in_progress()?;
        let id = self.questions[position].id();
        self.answers.insert_if_absent(id, Selection::Unanswered);
        self.advance(now)
    }

    /// Score the run and enter the terminal state.
    ///
    /// # Errors
    ///
    /// Returns `AlreadySubmitted` after submission, or `Result` if `now` precedes the start.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<QuizResult, QuizError> {
        self.in_progress()?;
        let result = QuizResult::completed(
            self.selection,
            score(&self.questions, &self.answers),
            self.questions.len(),
            self.started_at,
            now.max(self.started_at),
        )?;
        self.state = QuizState::Submitted(result.clone());
        Ok(result)
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("selection", &self.selection)
            .field("questions_len", &self.questions.len())
            .field("answers_len", &self.answers.len())
            .field("started_at", &self.started_at)
            .field("state", &self.state)
            .finish()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
