//! Application state composition.
//!
//! Top-level hierarchy:
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── gate: GateState          (loading / unauthenticated / authenticated)
//! │   ├── auth_stack: AuthStackState (login, sign-up, reset forms + route)
//! │   ├── main: MainState          (tab, home list state)
//! │   ├── tasks: Tasks             (busy flags for guarded submissions)
//! │   └── status: Option<StatusNotice> (transient bottom-line notice)
//! └── overlay: Option<Notice>      (blocking modal)
//! ```
//!
//! The gate is driven solely by session-change notifications: local
//! actions (sign-in, sign-out) never set it directly, they only cause the
//! auth client to emit.

use std::time::Instant;

use taskpad_core::auth::Session;

use crate::common::{TaskSeq, Tasks};
use crate::features::home::HomeState;
use crate::features::login::LoginState;
use crate::features::reset::ResetState;
use crate::features::signup::SignUpState;
use crate::notice::Notice;

/// How long a transient status notice stays visible.
pub const STATUS_NOTICE_TTL: std::time::Duration = std::time::Duration::from_secs(4);

/// Combined application state (split so overlay handling can borrow the
/// rest of the state without conflicts).
#[derive(Debug, Default)]
pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Notice>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Routing mode derived from the latest session notification.
#[derive(Debug, Default)]
pub enum GateState {
    /// No notification yet; renders a neutral indicator, performs no
    /// routing.
    #[default]
    Loading,
    /// Null session: the auth stack is mounted.
    Unauthenticated,
    /// Live session, carried as explicit state for everything below the
    /// gate.
    Authenticated { session: Session },
}

impl GateState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            GateState::Authenticated { session } => Some(session),
            GateState::Loading | GateState::Unauthenticated => None,
        }
    }
}

/// Screens in the unauthenticated stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthRoute {
    #[default]
    Login,
    SignUp,
    Reset,
}

/// Unauthenticated screen group: route plus per-screen form state.
#[derive(Debug, Default)]
pub struct AuthStackState {
    pub route: AuthRoute,
    pub login: LoginState,
    pub signup: SignUpState,
    pub reset: ResetState,
}

/// Tabs in the authenticated group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MainTab {
    #[default]
    Home,
    Profile,
}

/// Authenticated screen group.
#[derive(Debug, Default)]
pub struct MainState {
    pub tab: MainTab,
    pub home: HomeState,
}

/// Transient bottom-line notice (mutation and logout failures).
#[derive(Debug)]
pub struct StatusNotice {
    pub message: String,
    pub shown_at: Instant,
}

impl StatusNotice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= STATUS_NOTICE_TTL
    }
}

/// TUI application state (non-overlay).
#[derive(Debug, Default)]
pub struct TuiState {
    /// Flag indicating the app should quit.
    pub should_quit: bool,
    /// Routing mode from the latest session notification.
    pub gate: GateState,
    /// Unauthenticated screen group.
    pub auth_stack: AuthStackState,
    /// Authenticated screen group.
    pub main: MainState,
    /// Current feed generation. Bumped on every gate transition so
    /// notifications from a torn-down subscription can never attach.
    pub feed_gen: u64,
    /// Busy flags for guarded submissions.
    pub tasks: Tasks,
    /// Task id sequence.
    pub task_seq: TaskSeq,
    /// Transient status notice.
    pub status: Option<StatusNotice>,
    /// Spinner animation frame counter.
    pub spinner_frame: usize,
}

impl TuiState {
    /// Shows a transient status notice, replacing any current one.
    pub fn notify_status(&mut self, message: impl Into<String>) {
        self.status = Some(StatusNotice::new(message));
    }
}
