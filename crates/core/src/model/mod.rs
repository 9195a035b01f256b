mod answer;
mod ids;
mod profile;
mod question;
mod result;
mod selector;

pub use answer::{AnswerRecord, AnswerSheet, Selection, UNANSWERED_CODE};
pub use ids::{ParseIdError, QuestionId, UserId};
pub use profile::{Profile, ProfileError, Username, avatar_object_path};
pub use question::{OPTION_COUNT, OptionIndex, Question, QuestionError};
pub use result::{QuizResult, ResultError, percentage};
pub use selector::{Difficulty, QuizSelection, SelectorError, Topic};
