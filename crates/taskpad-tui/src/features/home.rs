//! Home screen: the live record list plus the add-entry field.
//!
//! The list is never edited locally. Every mutation goes to the backend
//! and the next snapshot from the subscription is the authority for what
//! the list contains; the one exception is clearing the input field once
//! an add is acknowledged.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use taskpad_core::auth::Session;
use taskpad_core::store::{Record, StoreError, Subscription};

use crate::common::Field;
use crate::effects::UiEffect;
use crate::events::MutationOp;
use crate::state::{MainTab, TuiState};

/// Lifecycle of the collection subscription for the current mount.
#[derive(Debug, Default)]
pub enum FeedState {
    /// Subscription requested but the handle hasn't arrived yet.
    #[default]
    Idle,
    /// Live handle; dropping it cancels the feed task.
    Live { sub: Subscription },
}

#[derive(Debug)]
pub struct HomeState {
    pub input: Field,
    pub records: Vec<Record>,
    /// Selected list row; `None` means the input field has focus.
    pub selected: Option<usize>,
    pub feed: FeedState,
    /// True once the first snapshot has arrived.
    pub loaded: bool,
}

impl Default for HomeState {
    fn default() -> Self {
        Self {
            input: Field::new("Add a todo"),
            records: Vec::new(),
            selected: None,
            feed: FeedState::default(),
            loaded: false,
        }
    }
}

impl HomeState {
    /// Replaces the list wholesale with a fresh snapshot, clamping the
    /// selection so it stays on a real row.
    pub fn apply_snapshot(&mut self, records: Vec<Record>) {
        self.records = records;
        self.loaded = true;
        self.selected = match self.selected {
            Some(_) if self.records.is_empty() => None,
            Some(i) => Some(i.min(self.records.len() - 1)),
            None => None,
        };
    }
}

pub fn handle_key(tui: &mut TuiState, session: &Session, key: KeyEvent) -> Vec<UiEffect> {
    let home = &mut tui.main.home;
    match home.selected {
        None => match key.code {
            KeyCode::Enter => {
                let title = home.input.value.trim().to_string();
                if title.is_empty() {
                    // Blank submissions are dropped without complaint.
                    return vec![];
                }
                vec![UiEffect::AddRecord {
                    session: session.clone(),
                    title,
                }]
            }
            KeyCode::Down if !home.records.is_empty() => {
                home.selected = Some(0);
                vec![]
            }
            KeyCode::Tab => {
                tui.main.tab = MainTab::Profile;
                vec![]
            }
            _ => {
                home.input.handle_key(key);
                vec![]
            }
        },
        Some(i) => match key.code {
            KeyCode::Up => {
                home.selected = if i == 0 { None } else { Some(i - 1) };
                vec![]
            }
            KeyCode::Down => {
                home.selected = Some((i + 1).min(home.records.len() - 1));
                vec![]
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let record = &home.records[i];
                vec![UiEffect::ToggleRecord {
                    session: session.clone(),
                    id: record.id.clone(),
                    completed: !record.completed,
                }]
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let record = &home.records[i];
                vec![UiEffect::DeleteRecord {
                    session: session.clone(),
                    id: record.id.clone(),
                }]
            }
            KeyCode::Esc => {
                home.selected = None;
                vec![]
            }
            KeyCode::Tab => {
                home.selected = None;
                tui.main.tab = MainTab::Profile;
                vec![]
            }
            _ => vec![],
        },
    }
}

pub fn handle_mutation_result(
    tui: &mut TuiState,
    op: MutationOp,
    result: Result<(), StoreError>,
) -> Vec<UiEffect> {
    match result {
        Ok(()) => {
            if op == MutationOp::Add {
                tui.main.home.input.clear();
            }
            // The snapshot that follows carries the actual list change.
        }
        Err(err) => {
            tracing::warn!(?op, "list mutation failed: {err}");
            let verb = match op {
                MutationOp::Add => "add",
                MutationOp::Toggle => "update",
                MutationOp::Delete => "delete",
            };
            tui.notify_status(format!("Couldn't {verb} item: {err}"));
        }
    }
    vec![]
}

pub fn render(tui: &TuiState, frame: &mut Frame, area: Rect) {
    let home = &tui.main.home;
    let [input_area, list_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    let input_focused = home.selected.is_none();
    let border_style = if input_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let display = home.input.display();
    let input_line = if input_focused {
        let at = display
            .char_indices()
            .nth(home.input.cursor)
            .map_or(display.len(), |(i, _)| i);
        let (before, rest) = display.split_at(at);
        let mut chars = rest.chars();
        let under_cursor = chars.next().unwrap_or(' ');
        let after: String = chars.collect();
        Line::from(vec![
            Span::raw(before.to_string()),
            Span::styled(
                under_cursor.to_string(),
                Style::default().add_modifier(Modifier::REVERSED),
            ),
            Span::raw(after),
        ])
    } else {
        Line::from(display)
    };
    frame.render_widget(
        Paragraph::new(input_line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(" Add a todo "),
        ),
        input_area,
    );

    if home.records.is_empty() {
        let placeholder = if home.loaded {
            "No todos yet. Type above and press Enter."
        } else {
            "Loading todos..."
        };
        frame.render_widget(
            Paragraph::new(placeholder).style(Style::default().fg(Color::DarkGray)),
            list_area,
        );
        return;
    }

    let items: Vec<ListItem> = home
        .records
        .iter()
        .map(|record| {
            let checkbox = if record.completed { "[x] " } else { "[ ] " };
            let style = if record.completed {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::raw(checkbox),
                Span::styled(record.title.clone(), style),
            ]))
        })
        .collect();
    let list = List::new(items)
        .highlight_style(Style::default().bg(Color::Rgb(40, 40, 40)))
        .highlight_symbol("› ");
    let mut list_state = ListState::default().with_selected(home.selected);
    frame.render_stateful_widget(list, list_area, &mut list_state);
}
