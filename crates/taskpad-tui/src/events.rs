//! UI event types.
//!
//! Everything the reducer reacts to arrives as a `UiEvent`: terminal
//! input, session-change notifications, collection snapshots, and the
//! results of spawned submissions. The runtime collects these each frame
//! and feeds them through `update`.

use taskpad_core::auth::{AuthError, SessionState};
use taskpad_core::store::{Record, StoreError, Subscription};

use crate::common::{TaskId, TaskKind};

/// Which list mutation a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    Add,
    Toggle,
    Delete,
}

/// Completion envelope for a guarded submission.
///
/// The inner event is re-dispatched only if the task is still the active
/// one for its kind; stale completions are dropped wholesale.
#[derive(Debug)]
pub struct TaskCompleted {
    pub id: TaskId,
    pub result: Box<UiEvent>,
}

/// Events processed by the reducer.
#[derive(Debug)]
pub enum UiEvent {
    /// Frame-cadence tick: spinner advance, transient-notice expiry.
    Tick,
    /// Raw terminal input.
    Terminal(crossterm::event::Event),
    /// Session-change notification (never `Unknown`; the runtime filters
    /// the pre-restore placeholder out).
    Session(SessionState),
    /// The feed for `generation` is live; the reducer attaches the
    /// subscription handle if the generation still matches.
    FeedOpened { generation: u64, sub: Subscription },
    /// Full-collection snapshot from the live feed.
    Snapshot { generation: u64, records: Vec<Record> },
    /// A guarded submission finished.
    TaskCompleted { kind: TaskKind, completed: TaskCompleted },
    /// Sign-in outcome; the session itself arrives via `Session`.
    SignInResult(Result<(), AuthError>),
    /// Sign-up plus verification-email outcome.
    SignUpResult(Result<(), AuthError>),
    /// Password-reset email outcome.
    ResetResult(Result<(), AuthError>),
    /// Sign-out outcome (error already stringified; `anyhow::Error` is
    /// not `Clone`).
    SignOutResult(Result<(), String>),
    /// One-shot list mutation outcome.
    MutationResult {
        op: MutationOp,
        result: Result<(), StoreError>,
    },
}
