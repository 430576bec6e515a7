//! Top-level render: routes to the screen for the current gate state.

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Tabs};
use taskpad_core::auth::Session;

use crate::features::form_screen::spinner_glyph;
use crate::features::{home, login, profile, reset, signup};
use crate::notice;
use crate::state::{AppState, AuthRoute, GateState, MainTab};

pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    match &app.tui.gate {
        GateState::Loading => render_loading(app, frame, area),
        GateState::Unauthenticated => match app.tui.auth_stack.route {
            AuthRoute::Login => login::render(&app.tui, frame, area),
            AuthRoute::SignUp => signup::render(&app.tui, frame, area),
            AuthRoute::Reset => reset::render(&app.tui, frame, area),
        },
        GateState::Authenticated { session } => render_main(app, session, frame, area),
    }

    if let Some(overlay) = &app.overlay {
        notice::render(overlay, frame);
    }
}

/// Neutral indicator while the initial session restore is pending.
fn render_loading(app: &AppState, frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            spinner_glyph(app.tui.spinner_frame),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" Loading..."),
    ]);
    let [target] = Layout::vertical([Constraint::Length(1)])
        .flex(Flex::Center)
        .areas(area);
    let [target] = Layout::horizontal([Constraint::Length(14.min(area.width))])
        .flex(Flex::Center)
        .areas(target);
    frame.render_widget(Paragraph::new(line), target);
}

fn render_main(app: &AppState, session: &Session, frame: &mut Frame, area: Rect) {
    let [tabs_area, content, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let selected = match app.tui.main.tab {
        MainTab::Home => 0,
        MainTab::Profile => 1,
    };
    let tabs = Tabs::new(vec!["Home", "Profile"])
        .select(selected)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan))
        .divider(" | ");
    frame.render_widget(tabs, tabs_area);

    match app.tui.main.tab {
        MainTab::Home => home::render(&app.tui, frame, content),
        MainTab::Profile => profile::render(&app.tui, session, frame, content),
    }

    render_status_line(app, frame, status_area);
}

fn render_status_line(app: &AppState, frame: &mut Frame, area: Rect) {
    if let Some(status) = &app.tui.status {
        frame.render_widget(
            Paragraph::new(status.message.as_str()).style(Style::default().fg(Color::Yellow)),
            area,
        );
        return;
    }
    let hints = match app.tui.main.tab {
        MainTab::Home => {
            "[Enter] add/toggle   [↑/↓] navigate   [d] delete   [Tab] profile   [Ctrl+C] quit"
        }
        MainTab::Profile => "[Enter] log out   [Tab] home   [Ctrl+C] quit",
    };
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
