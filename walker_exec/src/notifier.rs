//! # Operator notifications
//!
//! The motion stack reports outcomes the operator must see (completed trajectories, rejected
//! angles, empty trajectories) through a [`Notifier`]. How they are shown is up to the front end.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{error, info};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Title of notifications raised when a joint angle is rejected.
pub const TITLE_INVALID_ANGLE: &str = "Invalid angle";

/// Title of notifications raised when a trajectory without any displacement is requested.
pub const TITLE_EMPTY_TRAJECTORY: &str = "Trajectory not defined";

/// Title of notifications raised when a trajectory has been executed.
pub const TITLE_TRAJECTORY_COMPLETE: &str = "Trajectory complete";

/// Title of notifications raised when joint angles have been applied.
pub const TITLE_ANGLES_UPDATED: &str = "Angles updated";

/// Title of notifications raised when the walker has returned to its home stance.
pub const TITLE_HOME: &str = "Home";

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Sink for operator-facing messages.
pub trait Notifier {
    /// Report a successful outcome.
    fn info(&self, title: &str, message: &str);

    /// Report a rejected request or failure.
    fn error(&self, title: &str, message: &str);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Notifier writing every message into the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Notifier for LogNotifier {
    fn info(&self, title: &str, message: &str) {
        info!("[{}] {}", title, message);
    }

    fn error(&self, title: &str, message: &str) {
        error!("[{}] {}", title, message);
    }
}

// ------------------------------------------------------------------------------------------------
// TEST NOTIFIER
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
pub(crate) use self::recording::*;

#[cfg(test)]
mod recording {
    use super::Notifier;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Note {
        Info(String, String),
        Error(String, String),
    }

    /// Keeps every notification for later inspection.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct RecordingNotifier {
        notes: Arc<Mutex<Vec<Note>>>,
    }

    impl RecordingNotifier {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn notes(&self) -> Vec<Note> {
            self.notes.lock().unwrap().clone()
        }

        pub(crate) fn errors(&self) -> Vec<String> {
            self.notes()
                .into_iter()
                .filter_map(|n| match n {
                    Note::Error(t, _) => Some(t),
                    _ => None,
                })
                .collect()
        }

        pub(crate) fn infos(&self) -> Vec<String> {
            self.notes()
                .into_iter()
                .filter_map(|n| match n {
                    Note::Info(t, _) => Some(t),
                    _ => None,
                })
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn info(&self, title: &str, message: &str) {
            self.notes.lock().unwrap().push(Note::Info(title.into(), message.into()));
        }

        fn error(&self, title: &str, message: &str) {
            self.notes.lock().unwrap().push(Note::Error(title.into(), message.into()));
        }
    }
}
