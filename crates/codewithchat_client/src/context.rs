//! The user context: the one place the client holds the signed-in user.
//!
//! All changes go through [`UserContext::set_user`], which keeps the `user`
//! storage key in step with the in-memory value.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

use crate::api::ProfileSource;
use crate::error::ClientError;
use crate::models::User;
use crate::storage::{LocalStorage, TOKEN_KEY, USER_KEY};

pub struct UserContext {
    storage: Arc<dyn LocalStorage>,
    user: RwLock<Option<User>>,
}

impl UserContext {
    /// Starts from the cached user, if storage holds a readable one.
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        let user = read_cached_user(storage.as_ref());
        Self {
            storage,
            user: RwLock::new(user),
        }
    }

    pub fn user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the current user and writes it through to storage; `None`
    /// removes the `user` key.
    pub fn set_user(&self, user: Option<User>) -> Result<(), ClientError> {
        match &user {
            Some(u) => self.storage.set_item(USER_KEY, &serde_json::to_string(u)?)?,
            None => self.storage.remove_item(USER_KEY)?,
        }
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user;
        Ok(())
    }

    /// Resolves the user for a stored token.
    ///
    /// Without a token nothing happens. A cached user is used as is; otherwise
    /// the profile is fetched and cached. Fetch failures are logged and leave
    /// the context unchanged.
    pub async fn hydrate(&self, source: &dyn ProfileSource) -> Result<(), ClientError> {
        if self.storage.get_item(TOKEN_KEY)?.is_none() {
            return Ok(());
        }

        match self.storage.get_item(USER_KEY)? {
            Some(stored) => match serde_json::from_str::<User>(&stored) {
                Ok(user) => {
                    *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user)
                }
                Err(e) => warn!("Failed to parse stored user: {}", e),
            },
            None => match source.fetch_profile().await {
                Ok(user) => self.set_user(Some(user))?,
                Err(e) => warn!("Failed to fetch profile: {}", e),
            },
        }
        Ok(())
    }
}

fn read_cached_user(storage: &dyn LocalStorage) -> Option<User> {
    let stored = storage.get_item(USER_KEY).ok().flatten()?;
    serde_json::from_str(&stored).ok()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    pub(crate) fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            profile_pic: None,
        }
    }

    /// A profile source that counts calls and returns a fixed answer.
    pub(crate) struct StubProfile {
        pub user: Option<User>,
        pub calls: AtomicUsize,
    }

    impl StubProfile {
        pub(crate) fn returning(user: Option<User>) -> Self {
            Self {
                user,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ProfileSource for StubProfile {
        async fn fetch_profile(&self) -> Result<User, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.user.clone().ok_or(ClientError::Api {
                status: 401,
                message: "Unauthorized User".to_string(),
            })
        }
    }

    #[test]
    fn test_initial_user_comes_from_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let user = sample_user();
        storage
            .set_item(USER_KEY, &serde_json::to_string(&user).unwrap())
            .unwrap();

        let context = UserContext::new(storage);
        assert_eq!(context.user(), Some(user));
    }

    #[test]
    fn test_corrupt_cached_user_is_ignored() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(USER_KEY, "{not json").unwrap();

        let context = UserContext::new(storage);
        assert_eq!(context.user(), None);
    }

    #[test]
    fn test_set_user_writes_through_to_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let context = UserContext::new(storage.clone());

        context.set_user(Some(sample_user())).unwrap();
        assert!(storage.get_item(USER_KEY).unwrap().is_some());

        context.set_user(None).unwrap();
        assert_eq!(storage.get_item(USER_KEY).unwrap(), None);
        assert_eq!(context.user(), None);
    }

    #[test]
    fn test_context_survives_poisoned_lock() {
        let context = UserContext::new(Arc::new(MemoryStorage::new()));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = context.user.write().unwrap();
            panic!("writer crashed");
        }));
        assert!(result.is_err());

        let user = sample_user();
        context.set_user(Some(user.clone())).unwrap();
        assert_eq!(context.user(), Some(user));
    }

    #[tokio::test]
    async fn test_hydrate_without_token_does_nothing() {
        let storage = Arc::new(MemoryStorage::new());
        let context = UserContext::new(storage);
        let source = StubProfile::returning(Some(sample_user()));

        context.hydrate(&source).await.unwrap();

        assert_eq!(context.user(), None);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_hydrate_fetches_and_caches_missing_user() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(TOKEN_KEY, "abc").unwrap();
        let context = UserContext::new(storage.clone());
        let user = sample_user();
        let source = StubProfile::returning(Some(user.clone()));

        context.hydrate(&source).await.unwrap();

        assert_eq!(context.user(), Some(user));
        assert!(storage.get_item(USER_KEY).unwrap().is_some());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hydrate_prefers_cached_user() {
        let storage = Arc::new(MemoryStorage::new());
        let user = sample_user();
        storage.set_item(TOKEN_KEY, "abc").unwrap();
        storage
            .set_item(USER_KEY, &serde_json::to_string(&user).unwrap())
            .unwrap();
        let context = UserContext::new(storage);
        let source = StubProfile::returning(None);

        context.hydrate(&source).await.unwrap();

        assert_eq!(context.user(), Some(user));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_hydrate_fetch_failure_leaves_context_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(TOKEN_KEY, "stale").unwrap();
        let context = UserContext::new(storage);

        context.hydrate(&StubProfile::returning(None)).await.unwrap();

        assert_eq!(context.user(), None);
    }
}
