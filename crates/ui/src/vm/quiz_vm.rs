use quiz_core::QuizError;
use quiz_core::model::{OptionIndex, QuizSelection, Selection};
use services::{
    QuizCommand, QuizRunnerHandle, QuizService, QuizServiceError, QuizSnapshot, RunnerOutcome,
};

use super::time_fmt::format_countdown;
use crate::state::ViewError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizIntent {
    Choose(usize),
    Next,
    Previous,
    Pause,
    Resume,
    ToggleSound,
}

/// Countdown color band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerUrgency {
    Calm,
    Warning,
    Critical,
}

impl TimerUrgency {
    #[must_use]
    pub fn from_fraction(remaining: f64) -> Self {
        if remaining > 0.5 {
            TimerUrgency::Calm
        } else if remaining > 0.2 {
            TimerUrgency::Warning
        } else {
            TimerUrgency::Critical
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    Click,
    Correct,
    Incorrect,
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub index: usize,
    pub label: String,
    pub selected: bool,
}

/// Everything the quiz screen renders for one snapshot.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, PartialEq)]
pub struct QuizScreenVm {
    pub title: String,
    pub progress_label: String,
    pub progress_percent: u32,
    pub prompt: String,
    pub options: Vec<OptionVm>,
    pub timer_label: String,
    pub urgency: TimerUrgency,
    pub paused: bool,
    pub can_go_back: bool,
    pub can_go_next: bool,
    pub next_label: &'static str,
    pub finished: bool,
}

impl From<&QuizSnapshot> for QuizScreenVm {
    fn from(snap: &QuizSnapshot) -> Self {
        let chosen = snap.current_selection.and_then(Selection::chosen);
        let options = snap
            .question
            .as_ref()
            .map(|question| {
                question
                    .options()
                    .iter()
                    .enumerate()
                    .map(|(index, label)| OptionVm {
                        index,
                        label: label.clone(),
                        selected: chosen.is_some_and(|c| c.get() == index),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let current = (snap.position + 1).min(snap.total);
        let finished = snap.is_finished();

        Self {
            title: quiz_title(snap.selection),
            progress_label: format!("Question {current} of {}", snap.total),
            progress_percent: progress_percent(current, snap.total),
            prompt: snap
                .question
                .as_ref()
                .map(|q| q.prompt().to_owned())
                .unwrap_or_default(),
            options,
            timer_label: format_countdown(snap.remaining_secs),
            urgency: TimerUrgency::from_fraction(snap.fraction_remaining()),
            paused: snap.paused,
            can_go_back: !finished && !snap.is_first(),
            can_go_next: !finished && snap.current_selection.is_some(),
            next_label: if snap.is_last() { "Submit" } else { "Next" },
            finished,
        }
    }
}

#[must_use]
pub fn quiz_title(selection: QuizSelection) -> String {
    format!(
        "{} Quiz - {}",
        selection.topic.label(),
        selection.difficulty.label()
    )
}

/// Feedback sound for choosing `index` on the snapshot's question.
fn answer_cue(snap: &QuizSnapshot, index: usize) -> Option<SoundCue> {
    if snap.is_finished() {
        return None;
    }
    let question = snap.question.as_ref()?;
    let chosen = OptionIndex::new(index).ok()?;
    Some(if question.is_correct(chosen) {
        SoundCue::Correct
    } else {
        SoundCue::Incorrect
    })
}

fn progress_percent(current: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let percent = (current * 100 + total / 2) / total;
    u32::try_from(percent).unwrap_or(100)
}

/// Drives one running quiz from screen intents.
pub struct QuizVm {
    handle: QuizRunnerHandle,
    sound_enabled: bool,
}

impl QuizVm {
    #[must_use]
    pub fn new(handle: QuizRunnerHandle) -> Self {
        Self {
            handle,
            sound_enabled: true,
        }
    }

    #[must_use]
    pub fn screen(&self) -> QuizScreenVm {
        QuizScreenVm::from(&self.handle.snapshot())
    }

    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    /// Apply an intent and return the sound to play for it, if any.
    ///
    /// Earlier intents are applied before this one is checked. `Next` is
    /// ignored until the current question has an answer recorded, either a
    /// chosen option or a timed-out one; the countdown still advances
    /// unanswered questions on its own.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Unknown` once the runner has stopped.
    pub async fn dispatch(&mut self, intent: QuizIntent) -> Result<Option<SoundCue>, ViewError> {
        if intent == QuizIntent::ToggleSound {
            self.sound_enabled = !self.sound_enabled;
            return Ok(None);
        }

        let snap = self.settled().await?;
        let (command, cue) = match intent {
            QuizIntent::Choose(index) => (QuizCommand::Select(index), answer_cue(&snap, index)),
            QuizIntent::Next => {
                if !QuizScreenVm::from(&snap).can_go_next {
                    return Ok(None);
                }
                let cue = if snap.is_last() {
                    SoundCue::Complete
                } else {
                    SoundCue::Click
                };
                (QuizCommand::Next, Some(cue))
            }
            QuizIntent::Previous => (QuizCommand::Previous, Some(SoundCue::Click)),
            QuizIntent::Pause => (QuizCommand::Pause, None),
            QuizIntent::Resume => (QuizCommand::Resume, None),
            QuizIntent::ToggleSound => return Ok(None),
        };
        self.handle
            .send(command)
            .await
            .map_err(|_| ViewError::Unknown)?;
        Ok(cue.filter(|_| self.sound_enabled))
    }

    /// Screen state once every dispatched intent has been applied.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Unknown` once the runner has stopped.
    pub async fn settled_screen(&mut self) -> Result<QuizScreenVm, ViewError> {
        self.settled().await.map(|snap| QuizScreenVm::from(&snap))
    }

    /// Wait for the runner to publish its next snapshot, e.g. a countdown tick.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Unknown` once the runner has stopped.
    pub async fn changed(&mut self) -> Result<QuizScreenVm, ViewError> {
        self.handle
            .changed()
            .await
            .map(|snap| QuizScreenVm::from(&snap))
            .map_err(|_| ViewError::Unknown)
    }

    /// Wait for the run to end.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Unknown` if the runner task failed.
    pub async fn finish(self) -> Result<RunnerOutcome, ViewError> {
        self.handle.outcome().await.map_err(|_| ViewError::Unknown)
    }

    /// Leave the quiz without saving anything.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Unknown` if the runner task failed.
    pub async fn leave(self) -> Result<(), ViewError> {
        self.handle
            .abandon()
            .await
            .map(|_| ())
            .map_err(|_| ViewError::Unknown)
    }

    async fn settled(&mut self) -> Result<QuizSnapshot, ViewError> {
        self.handle.settled().await.map_err(|_| ViewError::Unknown)
    }
}

/// Start a quiz from raw `difficulty` / `topic` navigation parameters.
///
/// # Errors
///
/// Returns `ViewError::EmptyQuiz` when no questions match.
/// Returns `ViewError::Unknown` for other failures.
pub fn start_quiz(
    service: &QuizService,
    difficulty: Option<&str>,
    topic: Option<&str>,
) -> Result<QuizVm, ViewError> {
    let selection = QuizService::resolve_selection(difficulty, topic);
    match service.start(selection) {
        Ok(handle) => Ok(QuizVm::new(handle)),
        Err(QuizServiceError::Quiz(QuizError::Empty)) => Err(ViewError::EmptyQuiz),
        Err(_) => Err(ViewError::Unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Difficulty, Topic};
    use quiz_core::time::fixed_now;
    use quiz_core::{Countdown, QuestionBank, QuizSession};

    fn normal_math() -> QuizSession {
        let bank = QuestionBank::try_builtin().unwrap();
        let selection = QuizSelection::new(Difficulty::Normal, Topic::Math);
        QuizSession::from_bank(&bank, selection, fixed_now()).unwrap()
    }

    #[test]
    fn urgency_bands() {
        assert_eq!(TimerUrgency::from_fraction(1.0), TimerUrgency::Calm);
        assert_eq!(TimerUrgency::from_fraction(0.5), TimerUrgency::Warning);
        assert_eq!(TimerUrgency::from_fraction(0.21), TimerUrgency::Warning);
        assert_eq!(TimerUrgency::from_fraction(0.2), TimerUrgency::Critical);
        assert_eq!(TimerUrgency::from_fraction(0.0), TimerUrgency::Critical);
    }

    #[test]
    fn title_uses_labels() {
        let selection = QuizSelection::new(Difficulty::Hard, Topic::Gk);
        assert_eq!(quiz_title(selection), "General Knowledge Quiz - Hard");
    }

    #[test]
    fn progress_rounds_to_whole_percent() {
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(0, 0), 0);
    }

    #[test]
    fn next_requires_a_recorded_answer() {
        let mut session = normal_math();
        let countdown = Countdown::new(30).unwrap();

        let screen = QuizScreenVm::from(&QuizSnapshot::capture(&session, &countdown, None));
        assert!(!screen.can_go_next);

        session.select_option(2).unwrap();
        let screen = QuizScreenVm::from(&QuizSnapshot::capture(&session, &countdown, None));
        assert!(screen.can_go_next);
        assert!(screen.options[2].selected);
    }

    #[test]
    fn timed_out_question_allows_next_when_revisited() {
        let mut session = normal_math();
        let countdown = Countdown::new(30).unwrap();
        session.time_expire(fixed_now()).unwrap();
        session.retreat().unwrap();

        let snap = QuizSnapshot::capture(&session, &countdown, None);
        assert_eq!(snap.position, 0);
        assert_eq!(snap.current_selection, Some(Selection::Unanswered));

        let screen = QuizScreenVm::from(&snap);
        assert!(screen.can_go_next);
        assert!(screen.options.iter().all(|option| !option.selected));
    }
}
