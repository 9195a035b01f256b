use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use quiz_core::model::QuizResult;
use quiz_core::{AnswerFeedback, Countdown, QuizError, QuizSession, Step, Tick};

use super::service::{PersistStatus, Submission};
use super::snapshot::{QuizSnapshot, RunnerPhase};
use crate::Clock;
use crate::error::QuizServiceError;
use crate::handoff::ResultTicket;

const COMMAND_BUFFER: usize = 32;
const TICK: Duration = Duration::from_secs(1);

/// User intents delivered to a running quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizCommand {
    Select(usize),
    Next,
    Previous,
    Submit,
    Pause,
    Resume,
    Abandon,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunnerOutcome {
    Submitted {
        result: QuizResult,
        ticket: ResultTicket,
        /// Background save; awaiting it is optional.
        persist: JoinHandle<PersistStatus>,
    },
    Abandoned,
}

enum Transition {
    Stayed,
    Moved,
    Finished(QuizResult),
}

/// Owns one session and its countdown on a single task.
///
/// Commands and one-second ticks are consumed by the same loop, so each
/// transition completes before the next event is looked at.
pub struct QuizRunner {
    session: QuizSession,
    countdown: Countdown,
    clock: Clock,
    last_feedback: Option<AnswerFeedback>,
    applied: u64,
    snapshots: watch::Sender<QuizSnapshot>,
    submission: Submission,
}

impl QuizRunner {
    pub(crate) fn spawn(
        session: QuizSession,
        mut countdown: Countdown,
        clock: Clock,
        submission: Submission,
    ) -> QuizRunnerHandle {
        countdown.bind(0);
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshots, snapshots_rx) =
            watch::channel(QuizSnapshot::capture(&session, &countdown, None));

        let runner = Self {
            session,
            countdown,
            clock,
            last_feedback: None,
            applied: 0,
            snapshots,
            submission,
        };
        let task = tokio::spawn(runner.run(commands_rx));

        QuizRunnerHandle {
            commands: commands_tx,
            snapshots: snapshots_rx,
            sent: AtomicU64::new(0),
            task,
        }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<QuizCommand>) -> RunnerOutcome {
        let mut ticker = tokio::time::interval_at(Instant::now() + TICK, TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let transition = tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(QuizCommand::Abandon) | None => return self.abandon(),
                    Some(command) => {
                        self.applied += 1;
                        self.apply(command)
                    }
                },
                _ = ticker.tick() => self.on_tick(),
            };

            match transition {
                Transition::Stayed => {}
                // A new question gets a full second before its first tick.
                Transition::Moved => ticker.reset(),
                Transition::Finished(result) => return self.finish(result),
            }
            self.publish();
        }
    }

    fn apply(&mut self, command: QuizCommand) -> Transition {
        let outcome = match command {
            QuizCommand::Select(index) => self.session.select_option(index).map(|feedback| {
                self.last_feedback = Some(feedback);
                Transition::Stayed
            }),
            QuizCommand::Next => self.session.advance(self.clock.now()).map(|s| self.step(s)),
            QuizCommand::Previous => self.session.retreat().map(|s| self.step(s)),
            QuizCommand::Submit => self
                .session
                .submit(self.clock.now())
                .map(Transition::Finished),
            QuizCommand::Pause => {
                self.countdown.pause();
                Ok(Transition::Stayed)
            }
            QuizCommand::Resume => {
                self.countdown.resume();
                Ok(Transition::Stayed)
            }
            QuizCommand::Abandon => Ok(Transition::Stayed),
        };

        outcome.unwrap_or_else(|err: QuizError| {
            tracing::warn!(?command, error = %err, "quiz command ignored");
            Transition::Stayed
        })
    }

    fn on_tick(&mut self) -> Transition {
        match self.countdown.tick() {
            Tick::Expired => {
                tracing::debug!(position = ?self.session.position(), "question timed out");
                self.session
                    .time_expire(self.clock.now())
                    .map(|s| self.step(s))
                    .unwrap_or_else(|err| {
                        tracing::warn!(error = %err, "timeout ignored");
                        Transition::Stayed
                    })
            }
            Tick::Running(_) | Tick::Idle => Transition::Stayed,
        }
    }

    fn step(&mut self, step: Step) -> Transition {
        match step {
            Step::Moved { position } => {
                self.countdown.bind(position);
                self.last_feedback = None;
                tracing::debug!(position, "moved to question");
                Transition::Moved
            }
            Step::Stayed => Transition::Stayed,
            Step::Submitted(result) => Transition::Finished(result),
        }
    }

    fn capture(&self) -> QuizSnapshot {
        let mut snapshot =
            QuizSnapshot::capture(&self.session, &self.countdown, self.last_feedback);
        snapshot.applied = self.applied;
        snapshot
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.capture());
    }

    fn finish(self, result: QuizResult) -> RunnerOutcome {
        tracing::info!(
            score = result.score(),
            total = result.total(),
            secs = result.time_taken_secs(),
            "quiz submitted"
        );
        // Observers see the result before the save completes.
        self.publish();
        let (ticket, persist) = self.submission.finish(&result, self.session.answers());
        RunnerOutcome::Submitted {
            result,
            ticket,
            persist,
        }
    }

    fn abandon(self) -> RunnerOutcome {
        tracing::debug!("quiz abandoned");
        let mut snapshot = self.capture();
        snapshot.phase = RunnerPhase::Abandoned;
        self.snapshots.send_replace(snapshot);
        RunnerOutcome::Abandoned
    }
}

/// Caller side of a running quiz.
///
/// Dropping the handle abandons the run.
pub struct QuizRunnerHandle {
    commands: mpsc::Sender<QuizCommand>,
    snapshots: watch::Receiver<QuizSnapshot>,
    sent: AtomicU64,
    task: JoinHandle<RunnerOutcome>,
}

impl QuizRunnerHandle {
    /// # Errors
    ///
    /// Returns `QuizServiceError::RunnerClosed` once the run has ended.
    pub async fn send(&self, command: QuizCommand) -> Result<(), QuizServiceError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| QuizServiceError::RunnerClosed)?;
        self.sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::RunnerClosed` once the run has ended.
    pub async fn select(&self, index: usize) -> Result<(), QuizServiceError> {
        self.send(QuizCommand::Select(index)).await
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::RunnerClosed` once the run has ended.
    pub async fn next(&self) -> Result<(), QuizServiceError> {
        self.send(QuizCommand::Next).await
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::RunnerClosed` once the run has ended.
    pub async fn previous(&self) -> Result<(), QuizServiceError> {
        self.send(QuizCommand::Previous).await
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::RunnerClosed` once the run has ended.
    pub async fn submit(&self) -> Result<(), QuizServiceError> {
        self.send(QuizCommand::Submit).await
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::RunnerClosed` once the run has ended.
    pub async fn pause(&self) -> Result<(), QuizServiceError> {
        self.send(QuizCommand::Pause).await
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::RunnerClosed` once the run has ended.
    pub async fn resume(&self) -> Result<(), QuizServiceError> {
        self.send(QuizCommand::Resume).await
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        self.snapshots.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<QuizSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until every command sent through this handle has been applied,
    /// or the run has ended, and return that snapshot.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::RunnerClosed` if the runner stopped first.
    pub async fn settled(&mut self) -> Result<QuizSnapshot, QuizServiceError> {
        let sent = self.sent.load(Ordering::Relaxed);
        let snapshot = self
            .snapshots
            .wait_for(|s| s.applied >= sent || s.is_finished())
            .await
            .map_err(|_| QuizServiceError::RunnerClosed)?;
        Ok(snapshot.clone())
    }

    /// Wait for the next published snapshot.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::RunnerClosed` if the runner is gone.
    pub async fn changed(&mut self) -> Result<QuizSnapshot, QuizServiceError> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| QuizServiceError::RunnerClosed)?;
        Ok(self.snapshots.borrow_and_update().clone())
    }

    /// Wait for the run to end on its own (submission or timeouts).
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::RunnerClosed` if the runner task failed.
    pub async fn outcome(self) -> Result<RunnerOutcome, QuizServiceError> {
        let Self { commands, task, .. } = self;
        let outcome = task.await.map_err(|_| QuizServiceError::RunnerClosed);
        drop(commands);
        outcome
    }

    /// Discard the run. Nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::RunnerClosed` if the runner task failed.
    pub async fn abandon(self) -> Result<RunnerOutcome, QuizServiceError> {
        // The run may already be over; its outcome is still returned.
        let _ = self.commands.send(QuizCommand::Abandon).await;
        self.outcome().await
    }
}
