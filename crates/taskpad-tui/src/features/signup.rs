//! Account creation screen.
//!
//! Success shows a "verify your email" confirmation and returns to the
//! login screen rather than signing the new user in; the user confirms
//! their address first, then logs in on their own.

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
pub struct SignUpState {
    pub email: Field,
    pub password: Field,
    pub focus: usize,
}

impl Default for SignUpState {
    fn default() -> Self {
        Self {
            email: Field::new("Email"),
            password: Field::masked("Password"),
            focus: 0,
        }
    }
}

impl SignUpState {
    fn validate(&mut self) -> bool {
        self.email.error = validate::email_error(self.email.value.trim());
        self.password.error = validate::password_error(&self.password.value);
        self.email.error.is_none() && self.password.error.is_none()
    }
}

pub fn handle_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    let busy = tui.tasks.sign_up.is_running();
    match key.code {
        KeyCode::Esc if !busy => {
            tui.auth_stack.route = AuthRoute::Login;
            vec![]
        }
        KeyCode::Tab | KeyCode::Down => {
            tui.auth_stack.signup.focus = (tui.auth_stack.signup.focus + 1) % 2;
            vec![]
        }
        KeyCode::BackTab | KeyCode::Up => {
            tui.auth_stack.signup.focus = tui.auth_stack.signup.focus.wrapping_sub(1).min(1);
            vec![]
        }
        KeyCode::Enter => submit(tui, busy),
        _ => {
            if !busy {
                let form = &mut tui.auth_stack.signup;
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
    let form = &mut tui.auth_stack.signup;
    if !form.validate() {
        return vec![];
    }
    let task = tui.task_seq.next_id();
    tui.tasks.sign_up.begin(task);
    vec![UiEffect::SignUp {
        task,
        email: form.email.value.trim().to_string(),
        password: form.password.value.clone(),
    }]
}

pub fn handle_result(app: &mut AppState, result: Result<(), AuthError>) -> Vec<UiEffect> {
    match result {
        Ok(()) => {
            app.overlay = Some(Notice::new(
                "Success",
                "Verification email sent. Please check your inbox.",
            ));
            app.tui.auth_stack.signup = SignUpState::default();
            app.tui.auth_stack.route = AuthRoute::Login;
        }
        Err(err) => {
            let message = match err.kind {
                AuthErrorKind::EmailAlreadyInUse => {
                    "This email is already in use. Please use another email or log in.".to_string()
                }
                _ => err.message,
            };
            app.overlay = Some(Notice::new("Sign-Up Failed", message));
        }
    }
    vec![]
}

pub fn render(tui: &TuiState, frame: &mut Frame, area: Rect) {
    let form = &tui.auth_stack.signup;
    render_form(
        frame,
        area,
        &FormScreen {
            title: "Create Account",
            fields: &[&form.email, &form.password],
            focus: form.focus,
            busy: tui.tasks.sign_up.is_running(),
            busy_label: "Creating account...",
            submit_label: "[Enter] Sign up",
            hints: "[Esc] back to login   [Ctrl+C] quit",
            spinner_frame: tui.spinner_frame,
        },
    );
}
