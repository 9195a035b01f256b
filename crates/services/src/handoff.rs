//! Tab-scoped handoff of the last quiz result to the result screen.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use quiz_core::model::{AnswerRecord, AnswerSheet, QuizResult, QuizSelection, percentage};

use crate::error::HandoffError;

pub const RESULT_KEY: &str = "quizResult";

/// Ephemeral string store scoped to one tab. Cleared when the tab goes away.
#[derive(Debug, Clone, Default)]
pub struct TabStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl TabStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `HandoffError::Unavailable` if the store is poisoned.
    pub fn get(&self, key: &str) -> Result<Option<String>, HandoffError> {
        let guard = self.entries.lock().map_err(|_| HandoffError::Unavailable)?;
        Ok(guard.get(key).cloned())
    }

    /// # Errors
    ///
    /// Returns `HandoffError::Unavailable` if the store is poisoned.
    pub fn set(&self, key: &str, value: String) -> Result<(), HandoffError> {
        let mut guard = self.entries.lock().map_err(|_| HandoffError::Unavailable)?;
        guard.insert(key.to_owned(), value);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `HandoffError::Unavailable` if the store is poisoned.
    pub fn remove(&self, key: &str) -> Result<Option<String>, HandoffError> {
        let mut guard = self.entries.lock().map_err(|_| HandoffError::Unavailable)?;
        Ok(guard.remove(key))
    }

    /// # Errors
    ///
    /// Returns `HandoffError::Unavailable` if the store is poisoned.
    pub fn clear(&self) -> Result<(), HandoffError> {
        let mut guard = self.entries.lock().map_err(|_| HandoffError::Unavailable)?;
        guard.clear();
        Ok(())
    }
}

/// What the result screen needs to render and to offer "try again".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTicket {
    pub score: u32,
    pub total: u32,
    pub time_taken_secs: u32,
    pub selection: QuizSelection,
    pub answers: Vec<AnswerRecord>,
}

impl ResultTicket {
    #[must_use]
    pub fn new(result: &QuizResult, answers: &AnswerSheet) -> Self {
        Self {
            score: result.score(),
            total: result.total(),
            time_taken_secs: result.time_taken_secs(),
            selection: result.selection(),
            answers: answers.to_records(),
        }
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total)
    }
}

/// JSON-encoded `ResultTicket` kept in `TabStorage` between quiz and result screens.
#[derive(Debug, Clone, Default)]
pub struct ResultHandoff {
    tab: TabStorage,
}

impl ResultHandoff {
    #[must_use]
    pub fn new(tab: TabStorage) -> Self {
        Self { tab }
    }

    /// Store `ticket`, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns `HandoffError` if encoding fails or the store is unavailable.
    pub fn stash(&self, ticket: &ResultTicket) -> Result<(), HandoffError> {
        let encoded = serde_json::to_string(ticket)?;
        self.tab.set(RESULT_KEY, encoded)
    }

    /// Read the ticket without clearing it.
    ///
    /// # Errors
    ///
    /// Returns `HandoffError` if decoding fails or the store is unavailable.
    pub fn peek(&self) -> Result<Option<ResultTicket>, HandoffError> {
        self.tab
            .get(RESULT_KEY)?
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(HandoffError::from)
    }

    /// Read the ticket and clear the tab.
    ///
    /// # Errors
    ///
    /// Returns `HandoffError` if decoding fails or the store is unavailable.
    pub fn take(&self) -> Result<Option<ResultTicket>, HandoffError> {
        let ticket = self.peek()?;
        self.tab.clear()?;
        Ok(ticket)
    }

    /// # Errors
    ///
    /// Returns `HandoffError::Unavailable` if the store is poisoned.
    pub fn clear(&self) -> Result<(), HandoffError> {
        self.tab.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Difficulty, QuestionId, Selection, Topic};
    use quiz_core::time::fixed_now;

    fn ticket() -> ResultTicket {
        let now = fixed_now();
        let result = QuizResult::completed(
            QuizSelection::new(Difficulty::Medium, Topic::Sports),
            1,
            2,
            now,
            now + chrono::Duration::seconds(20),
        )
        .unwrap();
        let mut answers = AnswerSheet::new();
        answers.upsert(QuestionId::new(11), Selection::Unanswered);
        ResultTicket::new(&result, &answers)
    }

    #[test]
    fn stash_peek_and_take() {
        let handoff = ResultHandoff::default();
        assert_eq!(handoff.peek().unwrap(), None);

        let ticket = ticket();
        handoff.stash(&ticket).unwrap();
        assert_eq!(handoff.peek().unwrap(), Some(ticket.clone()));
        assert_eq!(handoff.take().unwrap(), Some(ticket));
        assert_eq!(handoff.peek().unwrap(), None);
    }

    #[test]
    fn ticket_encodes_sentinel_as_minus_one() {
        let tab = TabStorage::new();
        let handoff = ResultHandoff::new(tab.clone());
        handoff.stash(&ticket()).unwrap();
        let raw = tab.get(RESULT_KEY).unwrap().unwrap();
        assert!(raw.contains(r#""selection":-1"#));
        assert!(raw.contains(r#""topic":"sports""#));
    }

    #[test]
    fn corrupt_ticket_is_an_error() {
        let tab = TabStorage::new();
        tab.set(RESULT_KEY, "{not json".into()).unwrap();
        let handoff = ResultHandoff::new(tab);
        assert!(matches!(handoff.peek(), Err(HandoffError::Encoding(_))));
    }

    #[test]
    fn ticket_percentage_rounds() {
        assert_eq!(ticket().percentage(), 50);
    }
}
