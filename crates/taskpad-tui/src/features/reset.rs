//! Password-reset screen: a single email field.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use taskpad_core::auth::{AuthError, AuthErrorKind};
use taskpad_core::validate;

use super::form_screen::{FormScreen, render_form};
use crate::common::Field;
use crate::effects::UiEffect;
use crate::notice::Notice;
use crate::state::{AppState, AuthRoute, TuiState};

#[derive(Debug)]
pub struct ResetState {
    pub email: Field,
}

impl Default for ResetState {
    fn default() -> Self {
        Self {
            email: Field::new("Email"),
        }
    }
}

pub fn handle_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    let busy = tui.tasks.reset.is_running();
    match key.code {
        KeyCode::Esc if !busy => {
            tui.auth_stack.route = AuthRoute::Login;
            vec![]
        }
        KeyCode::Enter => submit(tui, busy),
        _ => {
            if !busy {
                tui.auth_stack.reset.email.handle_key(key);
            }
            vec![]
        }
    }
}

fn submit(tui: &mut TuiState, busy: bool) -> Vec<UiEffect> {
    if busy {
        return vec![];
    }
    let form = &mut tui.auth_stack.reset;
    form.email.error = validate::email_error(form.email.value.trim());
    if form.email.error.is_some() {
        return vec![];
    }
    let task = tui.task_seq.next_id();
    tui.tasks.reset.begin(task);
    vec![UiEffect::SendReset {
        task,
        email: form.email.value.trim().to_string(),
    }]
}

pub fn handle_result(app: &mut AppState, result: Result<(), AuthError>) -> Vec<UiEffect> {
    match result {
        Ok(()) => {
            app.overlay = Some(Notice::new("Success", "Password reset email sent!"));
            app.tui.auth_stack.reset = ResetState::default();
            app.tui.auth_stack.route = AuthRoute::Login;
        }
        Err(err) => {
            let message = match err.kind {
                // The backend refuses to say whether an account exists in
                // any more detail than this.
                AuthErrorKind::UserNotFound => "Please enter a valid email.".to_string(),
                _ => err.message,
            };
            app.overlay = Some(Notice::new("Reset Password Failed", message));
        }
    }
    vec![]
}

pub fn render(tui: &TuiState, frame: &mut Frame, area: Rect) {
    let form = &tui.auth_stack.reset;
    render_form(
        frame,
        area,
        &FormScreen {
            title: "Reset Password",
            fields: &[&form.email],
            focus: 0,
            busy: tui.tasks.reset.is_running(),
            busy_label: "Sending reset email...",
            submit_label: "[Enter] Send reset email",
            hints: "[Esc] back to login   [Ctrl+C] quit",
            spinner_frame: tui.spinner_frame,
        },
    );
}
