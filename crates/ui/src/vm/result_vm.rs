use quiz_core::model::QuizSelection;
use services::{ResultHandoff, ResultTicket};

use super::start_vm::quiz_link;
use crate::state::ViewError;

pub const HOME_LINK: &str = "/";
pub const LEADERBOARD_LINK: &str = "/leaderboard";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultVm {
    pub headline: &'static str,
    pub score_label: String,
    pub percent_label: String,
    pub selection: QuizSelection,
    pub try_again_link: String,
    pub home_link: &'static str,
    pub leaderboard_link: &'static str,
}

impl From<&ResultTicket> for ResultVm {
    fn from(ticket: &ResultTicket) -> Self {
        Self {
            headline: "Quiz Complete!",
            score_label: format!("{}/{}", ticket.score, ticket.total),
            percent_label: format!("{}%", ticket.percentage()),
            selection: ticket.selection,
            try_again_link: quiz_link(ticket.selection),
            home_link: HOME_LINK,
            leaderboard_link: LEADERBOARD_LINK,
        }
    }
}

/// Where the result route lands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResultScreen {
    Ready(ResultVm),
    /// Nothing was handed off; the screen redirects home.
    GoHome,
}

/// Read the handed-off result once. The tab is cleared afterwards, so
/// "try again" starts a fresh run.
///
/// # Errors
///
/// Returns `ViewError::Unknown` if the stored result cannot be read.
pub fn load_result(handoff: &ResultHandoff) -> Result<ResultScreen, ViewError> {
    let ticket = handoff.take().map_err(|_| ViewError::Unknown)?;
    Ok(match ticket {
        Some(ticket) => ResultScreen::Ready(ResultVm::from(&ticket)),
        None => ResultScreen::GoHome,
    })
}
