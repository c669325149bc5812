//! Gate for protected views.

use tracing::debug;

use crate::api::ProfileSource;
use crate::context::UserContext;
use crate::error::ClientError;
use crate::models::User;
use crate::storage::{LocalStorage, TOKEN_KEY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The protected view may render for this user.
    Render(User),
    RedirectToLogin,
}

/// Decides whether a protected view renders, hydrating the context first.
pub struct AuthGuard<'a> {
    storage: &'a dyn LocalStorage,
    context: &'a UserContext,
    profile: &'a dyn ProfileSource,
}

impl<'a> AuthGuard<'a> {
    pub fn new(
        storage: &'a dyn LocalStorage,
        context: &'a UserContext,
        profile: &'a dyn ProfileSource,
    ) -> Self {
        Self {
            storage,
            context,
            profile,
        }
    }

    /// Redirects when there is no token or no user could be resolved.
    pub async fn resolve(&self) -> Result<GuardOutcome, ClientError> {
        if self.storage.get_item(TOKEN_KEY)?.is_none() {
            debug!("No token stored, redirecting to login");
            return Ok(GuardOutcome::RedirectToLogin);
        }

        self.context.hydrate(self.profile).await?;
        Ok(match self.context.user() {
            Some(user) => GuardOutcome::Render(user),
            None => GuardOutcome::RedirectToLogin,
        })
    }
}
