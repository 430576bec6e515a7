//! Profile screen: account details and logout.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use taskpad_core::auth::Session;

use super::form_screen::spinner_glyph;
use crate::effects::UiEffect;
use crate::state::{MainTab, TuiState};

pub fn handle_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Tab => {
            tui.main.tab = MainTab::Home;
            vec![]
        }
        KeyCode::Enter => {
            if tui.tasks.sign_out.is_running() {
                return vec![];
            }
            let task = tui.task_seq.next_id();
            tui.tasks.sign_out.begin(task);
            vec![UiEffect::SignOut { task }]
        }
        _ => vec![],
    }
}

pub fn handle_result(tui: &mut TuiState, result: Result<(), String>) -> Vec<UiEffect> {
    if let Err(message) = result {
        tracing::warn!("logout failed: {message}");
        tui.notify_status(format!("Logout failed: {message}"));
    }
    // Success re-routes via the session-change notification.
    vec![]
}

pub fn render(tui: &TuiState, session: &Session, frame: &mut Frame, area: Rect) {
    let verified = if session.email_verified {
        Span::styled("verified", Style::default().fg(Color::Green))
    } else {
        Span::styled("not verified", Style::default().fg(Color::Yellow))
    };
    let action = if tui.tasks.sign_out.is_running() {
        Line::from(vec![
            Span::styled(
                spinner_glyph(tui.spinner_frame),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(" Logging out..."),
        ])
    } else {
        Line::from(Span::styled(
            "[Enter] Log out",
            Style::default().fg(Color::Green),
        ))
    };
    let lines = vec![
        Line::from(Span::styled(
            "Profile",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Email: ", Style::default().fg(Color::DarkGray)),
            Span::raw(session.email.clone()),
        ]),
        Line::from(vec![
            Span::styled("Status: ", Style::default().fg(Color::DarkGray)),
            verified,
        ]),
        Line::from(""),
        action,
    ];
    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let [target] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [target] = Layout::horizontal([Constraint::Length(48.min(area.width))])
        .flex(Flex::Center)
        .areas(target);
    frame.render_widget(Paragraph::new(lines), target);
}
