#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod handoff;
pub mod identity;
pub mod leaderboard_service;
pub mod profile_service;
pub mod quiz;
pub mod seed;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use config::QuizConfig;
pub use error::{
    AppServicesError, HandoffError, LeaderboardError, ProfileServiceError, QuizServiceError,
    SeedError,
};
pub use handoff::{ResultHandoff, ResultTicket, TabStorage};
pub use identity::{Identity, LocalIdentity};
pub use leaderboard_service::{LeaderboardFilter, LeaderboardService};
pub use profile_service::ProfileService;
pub use quiz::{
    PersistStatus, QuizCommand, QuizRunnerHandle, QuizService, QuizSnapshot, RunnerOutcome,
    RunnerPhase,
};
