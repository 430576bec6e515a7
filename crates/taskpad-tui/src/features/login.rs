//! Login screen: credential entry, local validation, submission.
//!
//! A successful sign-in performs no navigation here; the Session Gate
//! re-routes when the session-change notification lands.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
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
pub struct LoginState {
    pub email: Field,
    pub password: Field,
    pub focus: usize,
}

impl Default for LoginState {
    fn default() -> Self {
        Self {
            email: Field::new("Email"),
            password: Field::masked("Password"),
            focus: 0,
        }
    }
}

impl LoginState {
    fn validate(&mut self) -> bool {
        self.email.error = validate::email_error(self.email.value.trim());
        self.password.error = validate::password_error(&self.password.value);
        self.email.error.is_none() && self.password.error.is_none()
    }
}

pub fn handle_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    let busy = tui.tasks.sign_in.is_running();
    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            tui.auth_stack.login.focus = (tui.auth_stack.login.focus + 1) % 2;
            vec![]
        }
        KeyCode::BackTab | KeyCode::Up => {
            tui.auth_stack.login.focus = tui.auth_stack.login.focus.wrapping_sub(1).min(1);
            vec![]
        }
        KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            tui.auth_stack.signup = Default::default();
            tui.auth_stack.route = AuthRoute::SignUp;
            vec![]
        }
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            tui.auth_stack.reset = Default::default();
            tui.auth_stack.route = AuthRoute::Reset;
            vec![]
        }
        KeyCode::Enter => submit(tui, busy),
        _ => {
            if !busy {
                let form = &mut tui.auth_stack.login;
                let field = if form.focus == 0 {
                    &mut form.email
                } else {
                    &mut form.password
                };
                field.handle_key(key);
            }
            vec![]
        }
    }
}

fn submit(tui: &mut TuiState, busy: bool) -> Vec<UiEffect> {
    if busy {
        return vec![];
    }
    let form = &mut tui.auth_stack.login;
    if !form.validate() {
        return vec![];
    }
    let task = tui.task_seq.next_id();
    tui.tasks.sign_in.begin(task);
    vec![UiEffect::SignIn {
        task,
        email: form.email.value.trim().to_string(),
        password: form.password.value.clone(),
    }]
}

pub fn handle_result(app: &mut AppState, result: Result<(), AuthError>) -> Vec<UiEffect> {
    if let Err(err) = result {
        let message = match err.kind {
            AuthErrorKind::InvalidCredential => {
                "Please enter a valid email and password.".to_string()
            }
            _ => err.message,
        };
        app.overlay = Some(Notice::new("Login Failed", message));
    }
    // On success the gate listener re-routes; nothing to do here.
    vec![]
}

pub fn render(tui: &TuiState, frame: &mut Frame, area: Rect) {
    let form = &tui.auth_stack.login;
    render_form(
        frame,
        area,
        &FormScreen {
            title: "Login",
            fields: &[&form.email, &form.password],
            focus: form.focus,
            busy: tui.tasks.sign_in.is_running(),
            busy_label: "Signing in...",
            submit_label: "[Enter] Login",
            hints: "[Ctrl+N] create account   [Ctrl+R] forgot password   [Ctrl+C] quit",
            spinner_frame: tui.spinner_frame,
        },
    );
}
