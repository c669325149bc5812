//! End-to-end tests: the client library against the real API router, served
//! on a local port over the in-memory database.

use std::sync::Arc;

use api_lib::web::{build_router, state::AppState};
use codewithchat_client::models::RegisterForm;
use codewithchat_client::screens::{login, register, HomeScreen};
use codewithchat_client::storage::{TOKEN_KEY, USER_KEY};
use codewithchat_client::{
    FileStorage, GuardOutcome, LocalStorage, MemoryStorage, RecordingNotifier, Session, ToastKind,
};
use tempfile::tempdir;

/// Helper to serve a fresh API and return its base URL
async fn spawn_api() -> String {
    let app = build_router(Arc::new(AppState::in_memory()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

fn session_with(
    base_url: &str,
    storage: Arc<dyn LocalStorage>,
) -> (Session, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let session = Session::new(base_url, storage, notifier.clone()).unwrap();
    (session, notifier)
}

fn form(name: &str, email: &str) -> RegisterForm {
    RegisterForm {
        name: name.to_string(),
        email: email.to_string(),
        password: "secret".to_string(),
        profile_pic: None,
    }
}

#[tokio::test]
async fn test_register_then_guard_renders() {
    let base_url = spawn_api().await;
    let storage = Arc::new(MemoryStorage::new());
    let (session, notifier) = session_with(&base_url, storage.clone());

    assert!(register::submit(&session, &form("Ada", "ada@example.com")).await);
    assert_eq!(
        notifier.last(),
        Some((ToastKind::Success, "Registration successful!".to_string()))
    );
    assert!(storage.get_item(TOKEN_KEY).unwrap().is_some());
    assert!(storage.get_item(USER_KEY).unwrap().is_some());

    match session.guard().await.unwrap() {
        GuardOutcome::Render(user) => assert_eq!(user.email, "ada@example.com"),
        other => panic!("Expected Render, got {:?}", other),
    }
}

#[tokio::test]
async fn test_duplicate_registration_toasts_server_message() {
    let base_url = spawn_api().await;
    let (first, _) = session_with(&base_url, Arc::new(MemoryStorage::new()));
    assert!(register::submit(&first, &form("Ada", "ada@example.com")).await);

    let storage = Arc::new(MemoryStorage::new());
    let (second, notifier) = session_with(&base_url, storage.clone());
    assert!(!register::submit(&second, &form("Imposter", "ada@example.com")).await);

    let (kind, message) = notifier.last().unwrap();
    assert_eq!(kind, ToastKind::Error);
    assert!(message.contains("already exists"));
    assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_login_success_and_wrong_password() {
    let base_url = spawn_api().await;
    let (setup, _) = session_with(&base_url, Arc::new(MemoryStorage::new()));
    assert!(register::submit(&setup, &form("Ada", "ada@example.com")).await);

    let storage = Arc::new(MemoryStorage::new());
    let (session, notifier) = session_with(&base_url, storage.clone());

    assert!(!login::submit(&session, "ada@example.com", "wrong").await);
    assert_eq!(
        notifier.last(),
        Some((ToastKind::Error, "Invalid credentials".to_string()))
    );
    assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);

    assert!(login::submit(&session, "ada@example.com", "secret").await);
    assert_eq!(
        notifier.last(),
        Some((ToastKind::Success, "Login successful!".to_string()))
    );
    assert_eq!(session.context.user().unwrap().name, "Ada");
}

#[tokio::test]
async fn test_projects_are_scoped_to_their_creator() {
    let base_url = spawn_api().await;
    let (ada, _) = session_with(&base_url, Arc::new(MemoryStorage::new()));
    let (bob, _) = session_with(&base_url, Arc::new(MemoryStorage::new()));
    assert!(register::submit(&ada, &form("Ada", "ada@example.com")).await);
    assert!(register::submit(&bob, &form("Bob", "bob@example.com")).await);

    let mut home = HomeScreen::load(&ada).await;
    assert!(home.projects.is_empty());
    assert!(home.create_project(&ada, "first").await);
    assert!(home.create_project(&ada, "second").await);
    assert_eq!(home.projects[0].name, "second");

    let reloaded = HomeScreen::load(&ada).await;
    let names: Vec<_> = reloaded.projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["second", "first"]);

    assert!(HomeScreen::load(&bob).await.projects.is_empty());
}

#[tokio::test]
async fn test_create_project_failure_keeps_list() {
    let base_url = spawn_api().await;
    let (session, notifier) = session_with(&base_url, Arc::new(MemoryStorage::new()));
    assert!(register::submit(&session, &form("Ada", "ada@example.com")).await);

    let mut home = HomeScreen::load(&session).await;
    assert!(!home.create_project(&session, "  ").await);
    assert!(home.projects.is_empty());
    assert_eq!(
        notifier.last(),
        Some((ToastKind::Error, "Name is required".to_string()))
    );
}

#[tokio::test]
async fn test_logout_clears_storage_and_redirects() {
    let base_url = spawn_api().await;
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let (session, _) = session_with(&base_url, Arc::new(FileStorage::new(&path)));
    assert!(register::submit(&session, &form("Ada", "ada@example.com")).await);
    let token = session.storage.get_item(TOKEN_KEY).unwrap().unwrap();

    HomeScreen::logout(&session).await;
    assert_eq!(session.context.user(), None);

    // A new process over the same file finds nothing to resume.
    let storage = Arc::new(FileStorage::new(&path));
    assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
    assert_eq!(storage.get_item(USER_KEY).unwrap(), None);
    let (reloaded, _) = session_with(&base_url, storage.clone());
    assert_eq!(reloaded.guard().await.unwrap(), GuardOutcome::RedirectToLogin);

    // The old token is dead server-side too.
    storage.set_item(TOKEN_KEY, &token).unwrap();
    let (stale, _) = session_with(&base_url, storage);
    assert_eq!(stale.guard().await.unwrap(), GuardOutcome::RedirectToLogin);
}

#[tokio::test]
async fn test_token_without_cached_user_fetches_profile() {
    let base_url = spawn_api().await;
    let storage = Arc::new(MemoryStorage::new());
    let (session, _) = session_with(&base_url, storage.clone());
    assert!(register::submit(&session, &form("Ada", "ada@example.com")).await);

    storage.remove_item(USER_KEY).unwrap();
    let (reloaded, _) = session_with(&base_url, storage.clone());
    assert_eq!(reloaded.context.user(), None);

    match reloaded.guard().await.unwrap() {
        GuardOutcome::Render(user) => assert_eq!(user.name, "Ada"),
        other => panic!("Expected Render, got {:?}", other),
    }
    assert!(storage.get_item(USER_KEY).unwrap().is_some());
}

#[tokio::test]
async fn test_register_with_profile_picture_upload() {
    let base_url = spawn_api().await;
    let dir = tempdir().unwrap();
    let picture = dir.path().join("me.png");
    // PNG signature followed by filler; the server does not decode it.
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    bytes.resize(2048, 0);
    std::fs::write(&picture, &bytes).unwrap();

    let storage = Arc::new(MemoryStorage::new());
    let (session, notifier) = session_with(&base_url, storage.clone());
    let form = RegisterForm {
        profile_pic: Some(picture),
        ..form("Ada", "ada@example.com")
    };

    assert!(register::submit(&session, &form).await);
    assert_eq!(
        notifier.toasts(),
        vec![(ToastKind::Success, "Registration successful!".to_string())]
    );
    let user = session.context.user().unwrap();
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.profile_pic, None);
    assert!(storage.get_item(TOKEN_KEY).unwrap().is_some());
}
