use url::Url;

use quiz_core::model::{Profile, ProfileError, percentage};
use services::{ProfileService, ProfileServiceError};
use storage::repository::ResultRecord;

use super::time_fmt::{format_datetime, format_elapsed};
use crate::state::ViewError;

/// How many past runs the profile page lists.
pub const RECENT_RUNS: u32 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileVm {
    pub username: String,
    pub avatar_url: Option<Url>,
    /// Shown in place of a missing avatar.
    pub initial: char,
}

impl From<&Profile> for ProfileVm {
    fn from(profile: &Profile) -> Self {
        let username = profile.username.as_str().to_owned();
        let initial = username
            .chars()
            .next()
            .map_or('?', |c| c.to_ascii_uppercase());
        Self {
            username,
            avatar_url: profile.avatar_url.clone(),
            initial,
        }
    }
}

/// One line of the profile's run history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecentRunVm {
    pub topic_label: &'static str,
    pub difficulty_label: &'static str,
    pub score_label: String,
    pub percent: u32,
    pub time_label: String,
    pub completed_label: String,
}

impl From<&ResultRecord> for RecentRunVm {
    fn from(record: &ResultRecord) -> Self {
        Self {
            topic_label: record.selection.topic.label(),
            difficulty_label: record.selection.difficulty.label(),
            score_label: format!("{}/{}", record.score, record.total_questions),
            percent: percentage(record.score, record.total_questions),
            time_label: format_elapsed(record.time_taken_secs),
            completed_label: format_datetime(record.completed_at),
        }
    }
}

fn view_error(err: &ProfileServiceError) -> ViewError {
    match err {
        ProfileServiceError::NotSignedIn => ViewError::SignedOut,
        ProfileServiceError::Profile(
            ProfileError::EmptyUsername
            | ProfileError::UsernameTooLong
            | ProfileError::UnsupportedAvatar(_),
        ) => ViewError::InvalidInput,
        _ => ViewError::Unknown,
    }
}

/// # Errors
///
/// Returns `ViewError::SignedOut` without a user, `ViewError::Unknown` if the
/// profile is missing or cannot be read.
pub async fn load_profile(service: &ProfileService) -> Result<ProfileVm, ViewError> {
    match service.load().await {
        Ok(Some(profile)) => Ok(ProfileVm::from(&profile)),
        Ok(None) => Err(ViewError::Unknown),
        Err(err) => Err(view_error(&err)),
    }
}

/// The signed-in user's latest runs, newest first.
///
/// # Errors
///
/// Returns `ViewError::SignedOut` without a user, `ViewError::Unknown` if the
/// results cannot be read.
pub async fn load_recent_runs(service: &ProfileService) -> Result<Vec<RecentRunVm>, ViewError> {
    let records = service
        .recent_results(RECENT_RUNS)
        .await
        .map_err(|err| view_error(&err))?;
    Ok(records.iter().map(RecentRunVm::from).collect())
}

/// Upload an optional new avatar, then store username and avatar together.
///
/// Without a new image the current avatar is kept.
///
/// # Errors
///
/// Returns `ViewError::InvalidInput` for a blank name or a non-image file,
/// `ViewError::SignedOut` without a user, `ViewError::Unknown` otherwise.
pub async fn save_profile(
    service: &ProfileService,
    current: &ProfileVm,
    username: &str,
    avatar: Option<(&str, &[u8], &str)>,
) -> Result<ProfileVm, ViewError> {
    let avatar_url = match avatar {
        Some((file_name, bytes, content_type)) => Some(
            service
                .upload_avatar(file_name, bytes, content_type)
                .await
                .map_err(|err| view_error(&err))?,
        ),
        None => current.avatar_url.clone(),
    };
    let profile = service
        .save(username, avatar_url)
        .await
        .map_err(|err| view_error(&err))?;
    Ok(ProfileVm::from(&profile))
}
