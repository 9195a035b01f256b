use quiz_core::model::{Question, QuizResult, QuizSelection, Selection};
use quiz_core::{AnswerFeedback, Countdown, QuizSession};

/// Lifecycle of a runner as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerPhase {
    InProgress,
    Submitted(QuizResult),
    Abandoned,
}

/// Read-only view of a running quiz, published after every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSnapshot {
    pub selection: QuizSelection,
    pub position: usize,
    pub total: usize,
    pub question: Option<Question>,
    pub current_selection: Option<Selection>,
    pub answered: usize,
    pub remaining_secs: u32,
    pub duration_secs: u32,
    pub paused: bool,
    pub last_feedback: Option<AnswerFeedback>,
    pub phase: RunnerPhase,
    /// Commands the runner has processed so far, ignored ones included.
    pub applied: u64,
}

impl QuizSnapshot {
    #[must_use]
    pub fn capture(
        session: &QuizSession,
        countdown: &Countdown,
        last_feedback: Option<AnswerFeedback>,
    ) -> Self {
        let phase = match session.result() {
            Some(result) => RunnerPhase::Submitted(result.clone()),
            None => RunnerPhase::InProgress,
        };
        Self {
            selection: session.selection(),
            position: session
                .position()
                .unwrap_or_else(|| session.len().saturating_sub(1)),
            total: session.len(),
            question: session.current_question().cloned(),
            current_selection: session.current_selection(),
            answered: session.answers().len(),
            remaining_secs: countdown.remaining_secs(),
            duration_secs: countdown.duration_secs(),
            paused: countdown.is_paused(),
            last_feedback,
            phase,
            applied: 0,
        }
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.position == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.position + 1 == self.total
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        !matches!(self.phase, RunnerPhase::InProgress)
    }

    /// Remaining share of the countdown in `[0, 1]`.
    #[must_use]
    pub fn fraction_remaining(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        f64::from(self.remaining_secs) / f64::from(self.duration_secs)
    }

    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        match &self.phase {
            RunnerPhase::Submitted(result) => Some(result),
            RunnerPhase::InProgress | RunnerPhase::Abandoned => None,
        }
    }
}
