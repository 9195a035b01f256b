use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// The chosen difficulty and topic have no questions.
    EmptyQuiz,
    /// The action needs a signed-in user.
    SignedOut,
    /// The entered value was rejected, e.g. a blank username.
    InvalidInput,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::EmptyQuiz => "No questions match this selection.",
            ViewError::SignedOut => "Please sign in to continue.",
            ViewError::InvalidInput => "Please check your input and try again.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ViewError {}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

impl<T> ViewState<T> {
    #[must_use]
    pub fn from_result(result: Result<T, ViewError>) -> Self {
        match result {
            Ok(value) => ViewState::Ready(value),
            Err(err) => ViewState::Error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_from_result() {
        assert_eq!(ViewState::from_result(Ok(3)), ViewState::Ready(3));
        assert_eq!(
            ViewState::<u8>::from_result(Err(ViewError::EmptyQuiz)),
            ViewState::Error(ViewError::EmptyQuiz)
        );
        assert_eq!(
            ViewError::SignedOut.to_string(),
            "Please sign in to continue."
        );
    }
}
