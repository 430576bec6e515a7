//! Session state, persistence, and change notifications.
//!
//! The hub owns the single source of truth for "who is signed in" and fans
//! it out through a `watch` channel. UI code never reads a global handle;
//! it observes the channel and carries the resolved session as explicit
//! state.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The authenticated identity for the current application run.
///
/// Issued by the identity service on sign-in; observed, never mutated,
/// by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Stable user id, scopes the document collection.
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
    /// Opaque bearer token for store requests.
    pub id_token: String,
}

/// Latest session notification.
///
/// `Unknown` is the pre-restore startup value; subscribers treat it as
/// "no notification yet" and stay in their loading state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Unknown,
    SignedIn(Session),
    SignedOut,
}

impl SessionState {
    /// Returns the session if signed in.
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::SignedIn(session) => Some(session),
            SessionState::Unknown | SessionState::SignedOut => None,
        }
    }
}

/// Publishes session-change notifications and persists the session to disk.
#[derive(Debug)]
pub(crate) struct SessionHub {
    tx: watch::Sender<SessionState>,
    path: PathBuf,
}

impl SessionHub {
    pub fn new(path: PathBuf) -> Self {
        let (tx, _) = watch::channel(SessionState::Unknown);
        Self { tx, path }
    }

    /// Registers a listener for session-change notifications.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Emits the first notification from the persisted session, if any.
    ///
    /// A missing or unreadable file means signed out; a corrupt file is
    /// logged and treated the same way.
    pub fn restore(&self) {
        let state = match fs::read_to_string(&self.path) {
            Ok(contents) => match serde_json::from_str::<Session>(&contents) {
                Ok(session) => SessionState::SignedIn(session),
                Err(err) => {
                    tracing::warn!("discarding corrupt session file: {err}");
                    let _ = fs::remove_file(&self.path);
                    SessionState::SignedOut
                }
            },
            Err(_) => SessionState::SignedOut,
        };
        let _ = self.tx.send(state);
    }

    /// Persists the session and notifies subscribers.
    ///
    /// A persistence failure is logged but does not block the
    /// notification; the session is still valid for this run.
    pub fn publish_signed_in(&self, session: Session) {
        if let Err(err) = self.persist(&session) {
            tracing::warn!("failed to persist session: {err:#}");
        }
        let _ = self.tx.send(SessionState::SignedIn(session));
    }

    /// Removes the persisted session and notifies subscribers.
    ///
    /// # Errors
    /// Returns an error if the session file exists but cannot be removed.
    pub fn publish_signed_out(&self) -> anyhow::Result<()> {
        let result = match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(anyhow::Error::new(err).context("Failed to remove session file")),
        };
        // Notify regardless: the in-memory session is gone either way.
        let _ = self.tx.send(SessionState::SignedOut);
        result
    }

    fn persist(&self, session: &Session) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            uid: "u1".into(),
            email: "user@example.com".into(),
            email_verified: false,
            id_token: "tok".into(),
        }
    }

    #[test]
    fn restore_without_file_signs_out() {
        let dir = tempfile::tempdir().unwrap();
        let hub = SessionHub::new(dir.path().join("session.json"));
        let rx = hub.subscribe();
        hub.restore();
        assert_eq!(*rx.borrow(), SessionState::SignedOut);
    }

    #[test]
    fn sign_in_persists_and_survives_restore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let hub = SessionHub::new(path.clone());
        let rx = hub.subscribe();
        hub.publish_signed_in(session());
        assert_eq!(rx.borrow().session().map(|s| s.uid.as_str()), Some("u1"));

        // A fresh hub (new process) restores the same session.
        let hub2 = SessionHub::new(path);
        let rx2 = hub2.subscribe();
        hub2.restore();
        assert_eq!(*rx2.borrow(), SessionState::SignedIn(session()));
    }

    #[test]
    fn sign_out_removes_file_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let hub = SessionHub::new(path.clone());
        hub.publish_signed_in(session());
        let rx = hub.subscribe();
        hub.publish_signed_out().unwrap();
        assert_eq!(*rx.borrow(), SessionState::SignedOut);
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_file_restores_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let hub = SessionHub::new(path.clone());
        let rx = hub.subscribe();
        hub.restore();
        assert_eq!(*rx.borrow(), SessionState::SignedOut);
        assert!(!path.exists());
    }
}
