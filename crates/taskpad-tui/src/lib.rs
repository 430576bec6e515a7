//! Full-screen TUI implementation for Taskpad.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod notice;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};
use std::sync::Arc;

use anyhow::Result;
pub use runtime::TuiRuntime;
use taskpad_core::auth::AuthClient;
use taskpad_core::config::{Config, paths};
use taskpad_core::store::StoreClient;

/// Runs the interactive to-do client.
///
/// Builds the auth and store clients from `config`, restores the
/// persisted session (the gate leaves its loading state once that first
/// notification lands), then hands control to the event loop until quit.
///
/// # Errors
/// Returns an error if no terminal is attached or setup fails.
pub fn run_app(config: &Config) -> Result<()> {
    // The TUI needs a terminal to render into
    if !stderr().is_terminal() {
        anyhow::bail!("taskpad requires a terminal");
    }

    let auth = Arc::new(AuthClient::new(&config.backend, paths::session_path()));
    let store = Arc::new(StoreClient::new(&config.backend));

    let mut runtime = TuiRuntime::new(Arc::clone(&auth), store)?;
    auth.restore();
    runtime.run()?;

    Ok(())
}
