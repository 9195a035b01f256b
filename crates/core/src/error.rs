use thiserror::Error;

use crate::bank::BankError;
use crate::model::{ProfileError, QuestionError, ResultError};
use crate::quiz::QuizError;
use crate::timer::TimerError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error(transparent)]
    Result(#[from] ResultError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuizSelection, Username};
    use crate::quiz::QuizSession;
    use crate::time::fixed_now;

    fn start_empty() -> Result<QuizSession, Error> {
        let bank = crate::QuestionBank::new(Vec::new())?;
        Ok(QuizSession::from_bank(&bank, QuizSelection::default(), fixed_now())?)
    }

    fn blank_name() -> Result<Username, Error> {
        Ok(Username::new("  ")?)
    }

    #[test]
    fn domain_errors_convert() {
        assert!(matches!(start_empty(), Err(Error::Quiz(QuizError::Empty))));
        assert!(matches!(
            blank_name(),
            Err(Error::Profile(ProfileError::EmptyUsername))
        ));
    }
}
