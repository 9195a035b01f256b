use std::sync::Arc;

use url::Url;

use quiz_core::model::{Profile, UserId, Username, avatar_object_path};
use storage::repository::{
    ObjectKey, ObjectStore, ProfileRepository, ResultRecord, ResultRepository,
};

use crate::error::ProfileServiceError;
use crate::identity::Identity;

pub const AVATAR_BUCKET: &str = "avatars";

/// Profile reads and edits for the signed-in user.
#[derive(Clone)]
pub struct ProfileService {
    identity: Arc<dyn Identity>,
    profiles: Arc<dyn ProfileRepository>,
    objects: Arc<dyn ObjectStore>,
    results: Arc<dyn ResultRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(
        identity: Arc<dyn Identity>,
        profiles: Arc<dyn ProfileRepository>,
        objects: Arc<dyn ObjectStore>,
        results: Arc<dyn ResultRepository>,
    ) -> Self {
        Self {
            identity,
            profiles,
            objects,
            results,
        }
    }

    fn user(&self) -> Result<UserId, ProfileServiceError> {
        self.identity
            .current_user()
            .ok_or(ProfileServiceError::NotSignedIn)
    }

    /// # Errors
    ///
    /// Returns `NotSignedIn` without a user, or storage errors.
    pub async fn load(&self) -> Result<Option<Profile>, ProfileServiceError> {
        let user = self.user()?;
        Ok(self.profiles.get_profile(user).await?)
    }

    /// Create the profile on first sign-in; an existing profile is returned as is.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn`, an invalid username, or storage errors.
    pub async fn ensure_profile(&self, username: &str) -> Result<Profile, ProfileServiceError> {
        let user = self.user()?;
        if let Some(existing) = self.profiles.get_profile(user).await? {
            return Ok(existing);
        }
        let profile = Profile::new(user, Username::new(username)?);
        self.profiles.upsert_profile(&profile).await?;
        tracing::info!(%user, username = profile.username.as_str(), "profile created");
        Ok(profile)
    }

    /// The signed-in user's latest runs, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` without a user, or storage errors.
    pub async fn recent_results(
        &self,
        limit: u32,
    ) -> Result<Vec<ResultRecord>, ProfileServiceError> {
        let user = self.user()?;
        Ok(self.results.results_for_user(user, limit).await?)
    }

    /// Store an avatar image at `avatars/<user_id>/avatar.<ext>`, replacing any
    /// previous one, and return its public URL.
    ///
    /// The profile itself is not touched; pass the URL to `save`.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn`, `Profile(UnsupportedAvatar)` for non-image files,
    /// or storage errors.
    pub async fn upload_avatar(
        &self,
        file_name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<Url, ProfileServiceError> {
        let user = self.user()?;
        let key = ObjectKey::new(AVATAR_BUCKET, avatar_object_path(user, file_name)?);
        self.objects
            .put_object(&key, bytes, content_type, true)
            .await?;
        let url = self.objects.public_url(&key)?;
        tracing::debug!(%user, %url, "avatar uploaded");
        Ok(url)
    }

    /// Update username and avatar together.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn`, `Missing` if no profile exists yet, an invalid
    /// username, or storage errors.
    pub async fn save(
        &self,
        username: &str,
        avatar_url: Option<Url>,
    ) -> Result<Profile, ProfileServiceError> {
        let user = self.user()?;
        let mut profile = self
            .profiles
            .get_profile(user)
            .await?
            .ok_or(ProfileServiceError::Missing)?;
        profile.username = Username::new(username)?;
        profile.avatar_url = avatar_url;
        self.profiles.upsert_profile(&profile).await?;
        tracing::info!(%user, "profile updated");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::LocalIdentity;
    use chrono::Duration;
    use quiz_core::model::{ProfileError, QuizSelection};
    use quiz_core::time::fixed_now;
    use storage::repository::{InMemoryRepository, NewResultRecord};

    fn service(identity: &LocalIdentity, repo: &InMemoryRepository) -> ProfileService {
        ProfileService::new(
            Arc::new(identity.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        )
    }

    #[tokio::test]
    async fn requires_sign_in() {
        let svc = service(&LocalIdentity::new(), &InMemoryRepository::new());
        assert!(matches!(
            svc.load().await,
            Err(ProfileServiceError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn ensure_then_rename_with_avatar() {
        let user = UserId::random();
        let identity = LocalIdentity::signed_in(user);
        let repo = InMemoryRepository::new();
        let svc = service(&identity, &repo);

        let created = svc.ensure_profile("  ada ").await.unwrap();
        assert_eq!(created.username.as_str(), "ada");
        let again = svc.ensure_profile("other").await.unwrap();
        assert_eq!(again.username.as_str(), "ada");

        let url = svc
            .upload_avatar("face.JPG", b"jpeg", "image/jpeg")
            .await
            .unwrap();
        assert!(url.as_str().ends_with(&format!("avatars/{user}/avatar.jpg")));

        let saved = svc.save("grace", Some(url.clone())).await.unwrap();
        assert_eq!(saved.username.as_str(), "grace");
        assert_eq!(svc.load().await.unwrap().unwrap().avatar_url, Some(url));
    }

    #[tokio::test]
    async fn rejects_blank_names_and_non_images() {
        let identity = LocalIdentity::signed_in(UserId::random());
        let repo = InMemoryRepository::new();
        let svc = service(&identity, &repo);
        svc.ensure_profile("ada").await.unwrap();

        assert!(matches!(
            svc.save("   ", None).await,
            Err(ProfileServiceError::Profile(ProfileError::EmptyUsername))
        ));
        assert!(matches!(
            svc.upload_avatar("notes.txt", b"x", "text/plain").await,
            Err(ProfileServiceError::Profile(ProfileError::UnsupportedAvatar(_)))
        ));
    }

    #[tokio::test]
    async fn save_without_profile_is_missing() {
        let identity = LocalIdentity::signed_in(UserId::random());
        let svc = service(&identity, &InMemoryRepository::new());
        assert!(matches!(
            svc.save("ada", None).await,
            Err(ProfileServiceError::Missing)
        ));
    }

    #[tokio::test]
    async fn recent_results_are_the_users_own_newest_first() {
        let user = UserId::random();
        let identity = LocalIdentity::signed_in(user);
        let repo = InMemoryRepository::new();
        let svc = service(&identity, &repo);

        for (owner, minutes, score) in [(user, 0, 1), (UserId::random(), 1, 3), (user, 2, 2)] {
            repo.append_result(&NewResultRecord {
                user_id: owner,
                selection: QuizSelection::default(),
                score,
                total_questions: 3,
                time_taken_secs: 40,
                completed_at: fixed_now() + Duration::minutes(minutes),
            })
            .await
            .unwrap();
        }

        let recent = svc.recent_results(10).await.unwrap();
        assert_eq!(
            recent.iter().map(|r| r.score).collect::<Vec<_>>(),
            vec![2, 1]
        );
        assert!(recent.iter().all(|r| r.user_id == user));
        assert_eq!(svc.recent_results(1).await.unwrap().len(), 1);

        identity.sign_out();
        assert!(matches!(
            svc.recent_results(10).await,
            Err(ProfileServiceError::NotSignedIn)
        ));
    }
}
