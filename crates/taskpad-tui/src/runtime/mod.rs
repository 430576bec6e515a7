//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! The runtime uses an "inbox" pattern for async event collection:
//! - Spawned handlers send `UiEvent`s directly to `inbox_tx`
//! - Runtime drains `inbox_rx` each frame to collect results
//! - Session notifications and feed snapshots arrive on their own
//!   channels (a watch receiver and the subscription handle) and are
//!   folded into the same per-frame event batch.

mod inbox;

use std::future::Future;
use std::io::Stdout;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::event;
use inbox::{UiEventReceiver, UiEventSender};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use taskpad_core::auth::{AuthClient, SessionState};
use taskpad_core::store::StoreClient;
use tokio::sync::{mpsc, watch};

use crate::common::{TaskId, TaskKind};
use crate::effects::UiEffect;
use crate::events::{MutationOp, TaskCompleted, UiEvent};
use crate::features::home::FeedState;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Target frame rate while anything is in flight (60fps = ~16ms per frame).
pub const FRAME_DURATION: std::time::Duration = std::time::Duration::from_millis(16);

/// Poll duration when idle. Longer timeout reduces CPU usage when
/// nothing is happening.
pub const IDLE_POLL_DURATION: std::time::Duration = std::time::Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Runs the event loop and executes effects.
/// Terminal state is restored on drop and on panic.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    auth: Arc<AuthClient>,
    store: Arc<StoreClient>,
    /// Session-change notifications from the auth client.
    session_rx: watch::Receiver<SessionState>,
    /// Inbox sender - handlers send events here.
    inbox_tx: UiEventSender,
    /// Inbox receiver - runtime drains this each frame.
    inbox_rx: UiEventReceiver,
    /// Last time a Tick event was emitted.
    last_tick: std::time::Instant,
    /// Last time a terminal event was received (for fast tick during
    /// interaction).
    last_terminal_event: std::time::Instant,
}

impl TuiRuntime {
    /// Creates a new TUI runtime.
    ///
    /// Must be called within a tokio runtime; effect handlers are
    /// spawned onto it.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(auth: Arc<AuthClient>, store: Arc<StoreClient>) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        let session_rx = auth.subscribe();
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let now = std::time::Instant::now();
        Ok(Self {
            terminal,
            state: AppState::new(),
            auth,
            store,
            session_rx,
            inbox_tx,
            inbox_rx,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Runs the main event loop.
    ///
    /// # Errors
    /// Returns an error if terminal I/O fails.
    pub fn run(&mut self) -> Result<()> {
        let mut dirty = true; // Start dirty to ensure initial render

        while !self.state.tui.should_quit {
            let events = self.collect_events()?;

            for event in events {
                // Track terminal activity for fast tick mode
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = std::time::Instant::now();
                }

                // Only Tick triggers render - this caps frame rate at tick
                // cadence. Other events update state but batch renders to
                // the next Tick.
                let marks_dirty = matches!(&event, UiEvent::Tick);

                let effects = update::update(&mut self.state, event);
                if marks_dirty {
                    dirty = true;
                }
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    /// Collects events from all sources (session watch, feed, inbox,
    /// terminal).
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        // Fast polling while a submission is in flight or the user is
        // actively typing; slow polling otherwise to save CPU.
        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let needs_fast_poll = self.state.tui.tasks.is_any_running() || recent_terminal_activity;

        let tick_interval = if needs_fast_poll {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        self.collect_session_events(&mut events);
        self.collect_feed_events(&mut events);
        self.collect_inbox_events(&mut events);

        // Calculate time until next tick for poll duration.
        let time_until_tick = tick_interval.saturating_sub(self.last_tick.elapsed());

        // Poll terminal events:
        // - If we already have events to process, do non-blocking poll
        // - Otherwise, block until next tick is due
        let poll_duration = if events.is_empty() {
            time_until_tick
        } else {
            std::time::Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            // Drain any remaining buffered events (non-blocking)
            while event::poll(std::time::Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = std::time::Instant::now();
        }

        Ok(events)
    }

    /// Folds pending session-change notifications into the batch.
    ///
    /// The watch channel coalesces, so at most the latest state is seen
    /// each frame. The pre-restore `Unknown` placeholder never reaches
    /// the reducer.
    fn collect_session_events(&mut self, events: &mut Vec<UiEvent>) {
        while self.session_rx.has_changed().unwrap_or(false) {
            let state = self.session_rx.borrow_and_update().clone();
            if matches!(state, SessionState::Unknown) {
                continue;
            }
            events.push(UiEvent::Session(state));
        }
    }

    /// Drains pending snapshots from the live feed, tagging each with
    /// the current generation.
    fn collect_feed_events(&mut self, events: &mut Vec<UiEvent>) {
        let generation = self.state.tui.feed_gen;
        if let FeedState::Live { sub } = &mut self.state.tui.main.home.feed {
            while let Ok(records) = sub.try_recv() {
                events.push(UiEvent::Snapshot { generation, records });
            }
        }
    }

    /// Drains all events from the inbox channel.
    fn collect_inbox_events(&mut self, events: &mut Vec<UiEvent>) {
        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async effect, sending its result event to the inbox.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    /// Spawns a guarded submission with a uniform completion envelope.
    ///
    /// The reducer marked the task active when it emitted the effect; the
    /// completion arrives as `TaskCompleted` so stale results can be
    /// matched against the active id and dropped.
    fn spawn_task<F, Fut>(&self, kind: TaskKind, id: TaskId, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let inner = f().await;
            let completed = TaskCompleted {
                id,
                result: Box::new(inner),
            };
            let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
        });
    }

    /// Executes a single effect by dispatching to the appropriate handler.
    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }

            UiEffect::SignIn {
                task,
                email,
                password,
            } => {
                let auth = Arc::clone(&self.auth);
                self.spawn_task(TaskKind::SignIn, task, move || async move {
                    let result = auth.sign_in(&email, &password).await.map(|_session| ());
                    UiEvent::SignInResult(result)
                });
            }

            UiEffect::SignUp {
                task,
                email,
                password,
            } => {
                let auth = Arc::clone(&self.auth);
                self.spawn_task(TaskKind::SignUp, task, move || async move {
                    let result = match auth.sign_up(&email, &password).await {
                        Ok(session) => auth.send_verification_email(&session).await,
                        Err(err) => Err(err),
                    };
                    UiEvent::SignUpResult(result)
                });
            }

            UiEffect::SendReset { task, email } => {
                let auth = Arc::clone(&self.auth);
                self.spawn_task(TaskKind::Reset, task, move || async move {
                    UiEvent::ResetResult(auth.send_password_reset(&email).await)
                });
            }

            UiEffect::SignOut { task } => {
                let auth = Arc::clone(&self.auth);
                self.spawn_task(TaskKind::SignOut, task, move || async move {
                    UiEvent::SignOutResult(auth.sign_out().map_err(|e| format!("{e:#}")))
                });
            }

            UiEffect::OpenFeed { generation, session } => {
                let store = Arc::clone(&self.store);
                self.spawn_effect(move || async move {
                    let sub = store.subscribe(&session);
                    UiEvent::FeedOpened { generation, sub }
                });
            }

            UiEffect::AddRecord { session, title } => {
                let store = Arc::clone(&self.store);
                self.spawn_effect(move || async move {
                    let result = store.add(&session, &title).await.map(|_id| ());
                    UiEvent::MutationResult {
                        op: MutationOp::Add,
                        result,
                    }
                });
            }

            UiEffect::ToggleRecord {
                session,
                id,
                completed,
            } => {
                let store = Arc::clone(&self.store);
                self.spawn_effect(move || async move {
                    let result = store.set_completed(&session, &id, completed).await;
                    UiEvent::MutationResult {
                        op: MutationOp::Toggle,
                        result,
                    }
                });
            }

            UiEffect::DeleteRecord { session, id } => {
                let store = Arc::clone(&self.store);
                self.spawn_effect(move || async move {
                    let result = store.delete(&session, &id).await;
                    UiEvent::MutationResult {
                        op: MutationOp::Delete,
                        result,
                    }
                });
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
