use tracing::warn;

use crate::error::ClientError;
use crate::models::AuthResponse;
use crate::session::Session;
use crate::storage::TOKEN_KEY;

/// Stores the token and user from a successful login or registration.
///
/// Either both are stored or neither is.
pub(crate) fn sign_in(session: &Session, auth: AuthResponse) -> Result<(), ClientError> {
    session.storage.set_item(TOKEN_KEY, &auth.token)?;
    if let Err(e) = session.context.set_user(Some(auth.user)) {
        if let Err(cleanup) = session.storage.remove_item(TOKEN_KEY) {
            warn!("Failed to remove token after sign-in failure: {}", cleanup);
        }
        return Err(e);
    }
    Ok(())
}

/// Submits the login form. Returns whether the user is now signed in.
pub async fn submit(session: &Session, email: &str, password: &str) -> bool {
    let result = match session.api.login(email, password).await {
        Ok(auth) => sign_in(session, auth),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            session.notifier.success("Login successful!");
            true
        }
        Err(e) => {
            warn!("Login failed: {}", e);
            session
                .notifier
                .error(e.server_message().unwrap_or("Login failed!"));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::sample_user;
    use crate::notify::RecordingNotifier;
    use crate::storage::{LocalStorage, MemoryStorage, USER_KEY};
    use std::sync::Arc;

    /// Storage that refuses to write the `user` key.
    #[derive(Default)]
    struct NoUserStorage {
        inner: MemoryStorage,
    }

    impl LocalStorage for NoUserStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, ClientError> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), ClientError> {
            if key == USER_KEY {
                return Err(std::io::Error::other("disk full").into());
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<(), ClientError> {
            self.inner.remove_item(key)
        }
    }

    fn session_over(storage: Arc<dyn LocalStorage>) -> Session {
        Session::new(
            "http://localhost:3000/",
            storage,
            Arc::new(RecordingNotifier::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_sign_in_stores_token_and_user() {
        let storage = Arc::new(MemoryStorage::new());
        let session = session_over(storage.clone());
        let user = sample_user();

        sign_in(
            &session,
            AuthResponse {
                token: "abc".to_string(),
                user: user.clone(),
            },
        )
        .unwrap();

        assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), Some("abc".to_string()));
        assert_eq!(session.context.user(), Some(user));
    }

    #[test]
    fn test_failed_user_write_removes_token() {
        let storage = Arc::new(NoUserStorage::default());
        let session = session_over(storage.clone());

        let result = sign_in(
            &session,
            AuthResponse {
                token: "abc".to_string(),
                user: sample_user(),
            },
        );

        assert!(matches!(result, Err(ClientError::Io(_))));
        assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
        assert_eq!(session.context.user(), None);
    }
}
