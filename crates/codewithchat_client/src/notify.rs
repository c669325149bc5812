//! Toasts: short notifications shown after an action succeeds or fails.

use std::sync::{Mutex, MutexGuard, PoisonError};

use console::style;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

pub trait Notifier: Send + Sync {
    fn toast(&self, kind: ToastKind, message: &str);

    fn success(&self, message: &str) {
        self.toast(ToastKind::Success, message)
    }

    fn error(&self, message: &str) {
        self.toast(ToastKind::Error, message)
    }

    fn info(&self, message: &str) {
        self.toast(ToastKind::Info, message)
    }
}

/// Writes styled toasts to stderr.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn toast(&self, kind: ToastKind, message: &str) {
        let line = match kind {
            ToastKind::Success => style(format!("✔ {}", message)).green(),
            ToastKind::Error => style(format!("✖ {}", message)).red(),
            ToastKind::Info => style(format!("• {}", message)).cyan(),
        };
        eprintln!("{}", line);
    }
}

/// Keeps every toast, for assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<(ToastKind, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<(ToastKind, String)> {
        self.recorded().clone()
    }

    pub fn last(&self) -> Option<(ToastKind, String)> {
        self.recorded().last().cloned()
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<(ToastKind, String)>> {
        self.toasts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for RecordingNotifier {
    fn toast(&self, kind: ToastKind, message: &str) {
        self.recorded().push((kind, message.to_string()));
    }
}
