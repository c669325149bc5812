//! Terminal renditions of the login, register and home screens.
//!
//! Screens never return errors: failures become toasts plus a log line, and
//! the stored session is left as it was so the action can be retried.

pub mod home;
pub mod login;
pub mod register;

pub use home::HomeScreen;
