#![forbid(unsafe_code)]

pub mod bank;
pub mod error;
pub mod model;
pub mod quiz;
pub mod scoring;
pub mod time;
pub mod timer;

pub use bank::{BankError, QuestionBank};
pub use error::Error;
pub use quiz::{AnswerFeedback, QuizError, QuizSession, QuizState, Step};
pub use time::Clock;
pub use timer::{Countdown, Tick, TimerError};
