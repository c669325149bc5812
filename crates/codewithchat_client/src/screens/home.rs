use tracing::warn;

use crate::models::Project;
use crate::session::Session;
use crate::storage::TOKEN_KEY;

/// The project list shown after sign-in.
#[derive(Debug, Default)]
pub struct HomeScreen {
    pub projects: Vec<Project>,
}

impl HomeScreen {
    /// Loads the caller's projects. A failed load is logged and shows an empty list.
    pub async fn load(session: &Session) -> Self {
        let projects = session.api.all_projects().await.unwrap_or_else(|e| {
            warn!("Failed to load projects: {}", e);
            Vec::new()
        });
        Self { projects }
    }

    /// Creates a project and puts it at the top of the list.
    pub async fn create_project(&mut self, session: &Session, name: &str) -> bool {
        match session.api.create_project(name).await {
            Ok(project) => {
                session
                    .notifier
                    .success(&format!("Created project {}", project.name));
                self.projects.insert(0, project);
                true
            }
            Err(e) => {
                warn!("Create project error: {}", e);
                session.notifier.error(e.server_message().unwrap_or("Error"));
                false
            }
        }
    }

    /// Signs out. Local state is cleared even if the server call fails.
    pub async fn logout(session: &Session) {
        if let Err(e) = session.api.logout().await {
            warn!("Server logout failed: {}", e);
        }

        let cleared = session
            .storage
            .remove_item(TOKEN_KEY)
            .and_then(|_| session.context.set_user(None));
        match cleared {
            Ok(()) => session.notifier.info("Logged out"),
            Err(e) => {
                warn!("Failed to clear local session: {}", e);
                session.notifier.error("Could not clear the local session");
            }
        }
    }
}
