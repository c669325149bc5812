use tracing::warn;

use crate::error::ClientError;
use crate::models::RegisterForm;
use crate::screens::login::sign_in;
use crate::session::Session;

/// Submits the registration form. Returns whether the user is now signed in.
///
/// A profile picture that is not an image is rejected before anything is sent.
pub async fn submit(session: &Session, form: &RegisterForm) -> bool {
    let result = match session.api.register(form).await {
        Ok(auth) => sign_in(session, auth),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            session.notifier.success("Registration successful!");
            true
        }
        Err(e) => {
            warn!("Registration failed: {}", e);
            let message = match &e {
                ClientError::InvalidInput(msg) => msg.as_str(),
                other => other.server_message().unwrap_or("Registration failed!"),
            };
            session.notifier.error(message);
            false
        }
    }
}
