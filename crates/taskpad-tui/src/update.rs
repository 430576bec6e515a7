//! The reducer: applies one `UiEvent` to the state and returns effects.
//!
//! Pure state transitions only; the runtime executes the returned
//! effects. Routing follows session-change notifications exclusively, so
//! every auth flow converges on the same transitions regardless of which
//! screen triggered it.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use taskpad_core::auth::SessionState;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::features::home::FeedState;
use crate::features::{home, login, profile, reset, signup};
use crate::state::{AppState, AuthRoute, AuthStackState, GateState, MainState, MainTab};

pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.tui.spinner_frame = app.tui.spinner_frame.wrapping_add(1);
            if app
                .tui
                .status
                .as_ref()
                .is_some_and(crate::state::StatusNotice::is_expired)
            {
                app.tui.status = None;
            }
            vec![]
        }
        UiEvent::Terminal(event) => handle_terminal_event(app, event),
        UiEvent::Session(state) => handle_session_change(app, state),
        UiEvent::FeedOpened { generation, sub } => {
            if generation == app.tui.feed_gen && matches!(app.tui.gate, GateState::Authenticated { .. }) {
                app.tui.main.home.feed = FeedState::Live { sub };
            }
            // A mismatched handle is dropped here, which cancels its feed.
            vec![]
        }
        UiEvent::Snapshot { generation, records } => {
            if generation == app.tui.feed_gen && matches!(app.tui.gate, GateState::Authenticated { .. }) {
                app.tui.main.home.apply_snapshot(records);
            }
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            if app.tui.tasks.state_mut(kind).finish_if_active(completed.id) {
                update(app, *completed.result)
            } else {
                vec![]
            }
        }
        UiEvent::SignInResult(result) => login::handle_result(app, result),
        UiEvent::SignUpResult(result) => signup::handle_result(app, result),
        UiEvent::ResetResult(result) => reset::handle_result(app, result),
        UiEvent::SignOutResult(result) => profile::handle_result(&mut app.tui, result),
        UiEvent::MutationResult { op, result } => {
            home::handle_mutation_result(&mut app.tui, op, result)
        }
    }
}

/// Re-routes on a session-change notification.
///
/// Entering the authenticated group resets its state and opens a fresh
/// feed under a bumped generation; leaving it drops the subscription
/// (cancelling the feed task) and resets the auth stack.
fn handle_session_change(app: &mut AppState, state: SessionState) -> Vec<UiEffect> {
    match state {
        SessionState::Unknown => vec![],
        SessionState::SignedIn(session) => {
            let same_user = matches!(
                &app.tui.gate,
                GateState::Authenticated { session: current } if current.uid == session.uid
            );
            app.tui.gate = GateState::Authenticated {
                session: session.clone(),
            };
            if same_user {
                // Token refresh for the signed-in user; the feed stays up.
                return vec![];
            }
            app.tui.main = MainState::default();
            app.tui.feed_gen += 1;
            vec![UiEffect::OpenFeed {
                generation: app.tui.feed_gen,
                session,
            }]
        }
        SessionState::SignedOut => {
            app.tui.gate = GateState::Unauthenticated;
            app.tui.main = MainState::default();
            app.tui.feed_gen += 1;
            app.tui.auth_stack = AuthStackState::default();
            vec![]
        }
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    let Event::Key(key) = event else {
        return vec![];
    };
    if key.kind != KeyEventKind::Press {
        return vec![];
    }
    if is_quit_key(key) {
        app.tui.should_quit = true;
        return vec![UiEffect::Quit];
    }
    if app.overlay.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.overlay = None;
        }
        return vec![];
    }
    match &app.tui.gate {
        GateState::Loading => vec![],
        GateState::Unauthenticated => match app.tui.auth_stack.route {
            AuthRoute::Login => login::handle_key(&mut app.tui, key),
            AuthRoute::SignUp => signup::handle_key(&mut app.tui, key),
            AuthRoute::Reset => reset::handle_key(&mut app.tui, key),
        },
        GateState::Authenticated { session } => {
            let session = session.clone();
            match app.tui.main.tab {
                MainTab::Home => home::handle_key(&mut app.tui, &session, key),
                MainTab::Profile => profile::handle_key(&mut app.tui, key),
            }
        }
    }
}

fn is_quit_key(key: KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}
