//! Client side of CodeWithChat: a typed API client, the persisted session
//! (token and cached user), the auth guard for protected views, and the
//! screen flows the `cwc` binary drives.

pub mod api;
pub mod context;
pub mod error;
pub mod guard;
pub mod models;
pub mod notify;
pub mod screens;
pub mod session;
pub mod storage;

pub use api::{ApiClient, ProfileSource, DEFAULT_BASE_URL};
pub use context::UserContext;
pub use error::ClientError;
pub use guard::{AuthGuard, GuardOutcome};
pub use notify::{Notifier, RecordingNotifier, TerminalNotifier, ToastKind};
pub use session::Session;
pub use storage::{FileStorage, LocalStorage, MemoryStorage};
