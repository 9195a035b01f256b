use crate::model::{AnswerSheet, Question, Selection};

/// Number of questions answered correctly.
///
/// A question counts when its record is `Selection::Chosen` with the correct
/// index. Missing records and the `Unanswered` sentinel never count, so the
/// score is bounded by `questions.len()`.
#[must_use]
pub fn score(questions: &[Question], answers: &AnswerSheet) -> u32 {
    let correct = questions
        .iter()
        .filter(|q| matches!(answers.get(q.id()), Some(Selection::Chosen(i)) if q.is_correct(i)))
        .count();
    u32::try_from(correct).unwrap_or(u32::MAX)
}
