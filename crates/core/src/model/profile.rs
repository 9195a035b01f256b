use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::ids::UserId;

const MAX_USERNAME_CHARS: usize = 50;
const AVATAR_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("username cannot exceed {MAX_USERNAME_CHARS} characters")]
    UsernameTooLong,

    #[error("invalid avatar url: {0}")]
    InvalidAvatarUrl(String),

    #[error("unsupported avatar file: {0}")]
    UnsupportedAvatar(String),
}

/// Display name shown on the leaderboard. Trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// # Errors
    ///
    /// Returns `EmptyUsername` for blank input and `UsernameTooLong` past 50 characters.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ProfileError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ProfileError::EmptyUsername);
        }
        if trimmed.chars().count() > MAX_USERNAME_CHARS {
            return Err(ProfileError::UsernameTooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ProfileError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Public profile of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub username: Username,
    pub avatar_url: Option<Url>,
}

impl Profile {
    #[must_use]
    pub fn new(user_id: UserId, username: Username) -> Self {
        Self {
            user_id,
            username,
            avatar_url: None,
        }
    }

    /// Rehydrate from raw persisted columns.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if the username or avatar url is invalid.
    pub fn from_persisted(
        user_id: UserId,
        username: String,
        avatar_url: Option<String>,
    ) -> Result<Self, ProfileError> {
        let username = Username::new(username)?;
        let avatar_url = avatar_url
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| Url::parse(raw.trim()).map_err(|_| ProfileError::InvalidAvatarUrl(raw)))
            .transpose()?;
        Ok(Self {
            user_id,
            username,
            avatar_url,
        })
    }
}

/// Object path for a user's avatar: `<user_id>/avatar.<ext>`.
///
/// The extension is taken from `file_name` and lower-cased.
///
/// # Errors
///
/// Returns `ProfileError::UnsupportedAvatar` when the file has no image extension.
pub fn avatar_object_path(user_id: UserId, file_name: &str) -> Result<String, ProfileError> {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| AVATAR_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| ProfileError::UnsupportedAvatar(file_name.to_owned()))?;
    Ok(format!("{user_id}/avatar.{ext}"))
}
