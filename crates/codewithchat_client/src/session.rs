//! The objects every screen works with, created once per process and passed
//! by reference.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::context::UserContext;
use crate::error::ClientError;
use crate::guard::{AuthGuard, GuardOutcome};
use crate::notify::Notifier;
use crate::storage::LocalStorage;

pub struct Session {
    pub storage: Arc<dyn LocalStorage>,
    pub api: ApiClient,
    pub context: UserContext,
    pub notifier: Arc<dyn Notifier>,
}

impl Session {
    pub fn new(
        base_url: &str,
        storage: Arc<dyn LocalStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            api: ApiClient::new(base_url, storage.clone())?,
            context: UserContext::new(storage.clone()),
            storage,
            notifier,
        })
    }

    /// Runs the auth guard for a protected view.
    pub async fn guard(&self) -> Result<GuardOutcome, ClientError> {
        AuthGuard::new(self.storage.as_ref(), &self.context, &self.api)
            .resolve()
            .await
    }
}
