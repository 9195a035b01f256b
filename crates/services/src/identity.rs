use std::sync::{Arc, RwLock};

use quiz_core::model::UserId;

/// Source of the currently authenticated user.
pub trait Identity: Send + Sync {
    fn current_user(&self) -> Option<UserId>;
}

/// Process-local identity, signed in and out explicitly.
#[derive(Debug, Clone, Default)]
pub struct LocalIdentity {
    user: Arc<RwLock<Option<UserId>>>,
}

impl LocalIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn signed_in(user: UserId) -> Self {
        let identity = Self::new();
        identity.sign_in(user);
        identity
    }

    pub fn sign_in(&self, user: UserId) {
        // A poisoned lock still holds a valid Option.
        let mut guard = self.user.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(user);
        tracing::debug!(%user, "signed in");
    }

    pub fn sign_out(&self) {
        let mut guard = self.user.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

impl Identity for LocalIdentity {
    fn current_user(&self) -> Option<UserId> {
        *self.user.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_and_out() {
        let identity = LocalIdentity::new();
        assert_eq!(identity.current_user(), None);

        let user = UserId::random();
        identity.sign_in(user);
        assert_eq!(identity.current_user(), Some(user));

        let shared = identity.clone();
        shared.sign_out();
        assert_eq!(identity.current_user(), None);
    }
}
