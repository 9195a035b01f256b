mod runner;
mod service;
mod snapshot;

pub use runner::{QuizCommand, QuizRunner, QuizRunnerHandle, RunnerOutcome};
pub use service::{PersistStatus, QuizService};
pub use snapshot::{QuizSnapshot, RunnerPhase};
