//! Shared renderer for the credential form screens.
//!
//! Login, sign-up, and reset are the same shape: a title, a column of
//! labeled fields with inline errors, a submit line that turns into a
//! spinner while the submission is in flight, and a hint row.

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::common::Field;

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn spinner_glyph(frame: usize) -> &'static str {
    SPINNER[frame % SPINNER.len()]
}

pub struct FormScreen<'a> {
    pub title: &'static str,
    pub fields: &'a [&'a Field],
    pub focus: usize,
    pub busy: bool,
    pub busy_label: &'static str,
    pub submit_label: &'static str,
    pub hints: &'static str,
    pub spinner_frame: usize,
}

pub fn render_form(frame: &mut Frame, area: Rect, screen: &FormScreen) {
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            screen.title,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (i, field) in screen.fields.iter().enumerate() {
        let focused = i == screen.focus && !screen.busy;
        lines.push(Line::from(Span::styled(
            field.label,
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(field_line(field, focused));
        lines.push(match field.error {
            Some(err) => Line::from(Span::styled(err, Style::default().fg(Color::Red))),
            None => Line::from(""),
        });
    }
    lines.push(Line::from(""));
    if screen.busy {
        lines.push(Line::from(vec![
            Span::styled(
                spinner_glyph(screen.spinner_frame),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(" "),
            Span::raw(screen.busy_label),
        ]));
    } else {
        lines.push(Line::from(Span::styled(
            screen.submit_label,
            Style::default().fg(Color::Green),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        screen.hints,
        Style::default().fg(Color::DarkGray),
    )));

    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let target = centered(area, 64, height);
    frame.render_widget(Paragraph::new(lines), target);
}

/// One field value line with a block cursor when focused.
fn field_line(field: &Field, focused: bool) -> Line<'static> {
    let display = field.display();
    let prompt = if focused { "› " } else { "  " };
    let mut spans = vec![Span::styled(prompt, Style::default().fg(Color::Cyan))];
    if focused {
        let at = display
            .char_indices()
            .nth(field.cursor)
            .map_or(display.len(), |(i, _)| i);
        let (before, rest) = display.split_at(at);
        let mut chars = rest.chars();
        let under_cursor = chars.next().unwrap_or(' ');
        let after: String = chars.collect();
        spans.push(Span::raw(before.to_string()));
        spans.push(Span::styled(
            under_cursor.to_string(),
            Style::default().add_modifier(Modifier::REVERSED),
        ));
        spans.push(Span::raw(after));
    } else {
        spans.push(Span::raw(display));
    }
    Line::from(spans)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    area
}
