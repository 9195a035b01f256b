use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::QuestionId;
use crate::model::question::{OptionIndex, QuestionError};

/// Wire/storage code for "no answer".
pub const UNANSWERED_CODE: i8 = -1;

/// What the user ended up with for one question.
///
/// `Unanswered` is the sentinel recorded when the countdown expires before a
/// selection was made. It never compares equal to any option index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Selection {
    Chosen(OptionIndex),
    Unanswered,
}

impl Selection {
    #[must_use]
    pub fn chosen(self) -> Option<OptionIndex> {
        match self {
            Selection::Chosen(index) => Some(index),
            Selection::Unanswered => None,
        }
    }

    /// Encodes the selection as `0..=3`, or `-1` for the sentinel.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn to_code(self) -> i8 {
        match self {
            Selection::Chosen(index) => u8::from(index) as i8,
            Selection::Unanswered => UNANSWERED_CODE,
        }
    }

    /// Decodes a stored selection code. This must stay consistent with `to_code`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::OptionOutOfRange` for anything other than `-1..=3`.
    pub fn from_code(code: i64) -> Result<Self, QuestionError> {
        if code == i64::from(UNANSWERED_CODE) {
            return Ok(Selection::Unanswered);
        }
        let index = usize::try_from(code).map_err(|_| QuestionError::OptionOutOfRange(usize::MAX))?;
        OptionIndex::new(index).map(Selection::Chosen)
    }
}

impl TryFrom<i8> for Selection {
    type Error = QuestionError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Self::from_code(i64::from(value))
    }
}

impl From<Selection> for i8 {
    fn from(value: Selection) -> Self {
        value.to_code()
    }
}

/// One question's recorded selection within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub selection: Selection,
}

/// Answer records keyed by question id; at most one record per question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    records: BTreeMap<QuestionId, Selection>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `question_id`, returning the previous selection.
    pub fn upsert(&mut self, question_id: QuestionId, selection: Selection) -> Option<Selection> {
        self.records.insert(question_id, selection)
    }

    /// Insert only when no record exists yet. Returns whether a record was added.
    pub fn insert_if_absent(&mut self, question_id: QuestionId, selection: Selection) -> bool {
        if self.records.contains_key(&question_id) {
            return false;
        }
        self.records.insert(question_id, selection);
        true
    }

    #[must_use]
    pub fn get(&self, question_id: QuestionId) -> Option<Selection> {
        self.records.get(&question_id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AnswerRecord> + '_ {
        self.records.iter().map(|(id, selection)| AnswerRecord {
            question_id: *id,
            selection: *selection,
        })
    }

    #[must_use]
    pub fn to_records(&self) -> Vec<AnswerRecord> {
        self.iter().collect()
    }
}

impl FromIterator<AnswerRecord> for AnswerSheet {
    fn from_iter<T: IntoIterator<Item = AnswerRecord>>(iter: T) -> Self {
        let mut sheet = AnswerSheet::new();
        for record in iter {
            sheet.upsert(record.question_id, record.selection);
        }
        sheet
    }
}
