//! Framework-free view models for the quiz screens.

pub mod state;
pub mod vm;

pub use state::{ViewError, ViewState};
