//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime
//! executes. They represent I/O and task spawning only; the reducer
//! mutates state and returns effects, never performs I/O itself.

use taskpad_core::auth::Session;

use crate::common::TaskId;

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Submit a sign-in request.
    SignIn {
        task: TaskId,
        email: String,
        password: String,
    },

    /// Submit a sign-up request, followed by a verification email.
    SignUp {
        task: TaskId,
        email: String,
        password: String,
    },

    /// Request a password-reset email.
    SendReset { task: TaskId, email: String },

    /// Terminate the current session.
    SignOut { task: TaskId },

    /// Open the collection subscription for a freshly authenticated
    /// session. `generation` ties the resulting feed to the current mount.
    OpenFeed { generation: u64, session: Session },

    /// Add a record (trimmed, non-empty title; `completed` starts false).
    AddRecord { session: Session, title: String },

    /// Set a record's `completed` flag to `completed`.
    ToggleRecord {
        session: Session,
        id: String,
        completed: bool,
    },

    /// Delete a record.
    DeleteRecord { session: Session, id: String },
}
