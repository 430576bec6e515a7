//! Identity service client.
//!
//! Thin typed wrapper over the hosted identity REST API. The client
//! consumes five operations (sign-in, sign-up, verification email,
//! password-reset email, sign-out) and publishes session-change
//! notifications through [`AuthClient::subscribe`].
//!
//! Sign-out is a local operation: it clears the persisted session and
//! notifies subscribers; the bearer token simply stops being used.

mod session;

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::json;
pub use session::{Session, SessionState};
use tokio::sync::watch;

use crate::config::BackendConfig;

/// Error category for identity service failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// Credential the service rejects as malformed or mismatched.
    InvalidCredential,
    /// Sign-up for an identity that already exists.
    EmailAlreadyInUse,
    /// Reset request for an unknown identity.
    UserNotFound,
    /// Any other API-level error; the service message is surfaced verbatim.
    Api,
    /// Connection or transport failure before a response arrived.
    Network,
}

/// Error returned by identity service operations.
#[derive(Debug, Clone)]
pub struct AuthError {
    pub kind: AuthErrorKind,
    /// One-line summary suitable for display.
    pub message: String,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn network(err: &reqwest::Error) -> Self {
        Self::new(AuthErrorKind::Network, format!("Request failed: {err}"))
    }

    /// Maps a service error body (`{"error": {"message": CODE}}`) to a
    /// typed error. Unknown codes surface verbatim as generic API errors.
    fn from_error_body(status: reqwest::StatusCode, body: &serde_json::Value) -> Self {
        let code = body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or("");
        match code {
            "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "INVALID_EMAIL" => {
                Self::new(AuthErrorKind::InvalidCredential, code)
            }
            "EMAIL_EXISTS" => Self::new(AuthErrorKind::EmailAlreadyInUse, code),
            "EMAIL_NOT_FOUND" => Self::new(AuthErrorKind::UserNotFound, code),
            "" => Self::new(
                AuthErrorKind::Api,
                format!("Identity service returned HTTP {status}"),
            ),
            other => Self::new(AuthErrorKind::Api, other),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AuthError {}

/// Account payload returned by sign-in and sign-up.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    email_verified: bool,
    id_token: String,
}

/// Identity service client.
#[derive(Debug)]
pub struct AuthClient {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
    hub: session::SessionHub,
}

impl AuthClient {
    /// Creates a client for the configured identity service, persisting
    /// the session at `session_path`.
    pub fn new(backend: &BackendConfig, session_path: PathBuf) -> Self {
        Self {
            base_url: backend.auth_url.clone(),
            api_key: backend.api_key.clone(),
            http: reqwest::Client::new(),
            hub: session::SessionHub::new(session_path),
        }
    }

    /// Registers a listener for session-change notifications.
    ///
    /// The receiver starts at [`SessionState::Unknown`]; the first real
    /// notification arrives once [`AuthClient::restore`] or a sign-in/out
    /// runs.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.hub.subscribe()
    }

    /// Restores the persisted session, emitting the first notification.
    pub fn restore(&self) {
        self.hub.restore();
    }

    /// Signs in with email and password.
    ///
    /// On success the session is persisted and published to subscribers;
    /// callers should not navigate explicitly.
    ///
    /// # Errors
    /// Returns the mapped service error on rejection.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let body = json!({ "email": email, "password": password, "returnSecureToken": true });
        let account: AccountResponse = self.post("signInWithPassword", &body).await?;
        let session = Session {
            uid: account.local_id,
            email: account.email,
            email_verified: account.email_verified,
            id_token: account.id_token,
        };
        self.hub.publish_signed_in(session.clone());
        Ok(session)
    }

    /// Creates a new account.
    ///
    /// The returned session is *not* published: sign-up hands the user
    /// back to the login screen for a fresh, verified sign-in.
    ///
    /// # Errors
    /// Returns the mapped service error on rejection.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let body = json!({ "email": email, "password": password, "returnSecureToken": true });
        let account: AccountResponse = self.post("signUp", &body).await?;
        Ok(Session {
            uid: account.local_id,
            email: account.email,
            email_verified: account.email_verified,
            id_token: account.id_token,
        })
    }

    /// Requests a verification email for a freshly created account.
    ///
    /// # Errors
    /// Returns the mapped service error on rejection.
    pub async fn send_verification_email(&self, session: &Session) -> Result<(), AuthError> {
        let body = json!({ "requestType": "VERIFY_EMAIL", "idToken": session.id_token });
        let _: serde_json::Value = self.post("sendOobCode", &body).await?;
        Ok(())
    }

    /// Requests a password-reset email.
    ///
    /// # Errors
    /// Returns the mapped service error on rejection.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let body = json!({ "requestType": "PASSWORD_RESET", "email": email });
        let _: serde_json::Value = self.post("sendOobCode", &body).await?;
        Ok(())
    }

    /// Terminates the current session.
    ///
    /// Clears the persisted session and publishes the signed-out
    /// notification; the UI re-routes from the notification, not from the
    /// return value.
    ///
    /// # Errors
    /// Returns an error if the persisted session cannot be removed.
    pub fn sign_out(&self) -> anyhow::Result<()> {
        self.hub.publish_signed_out()
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, AuthError> {
        let mut url = format!("{}/v1/accounts:{method}", self.base_url);
        if let Some(key) = &self.api_key {
            url.push_str("?key=");
            url.push_str(key);
        }

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| AuthError::network(&err))?;

        let status = response.status();
        let payload: serde_json::Value = response.json().await.map_err(|err| {
            AuthError::new(
                AuthErrorKind::Api,
                format!("Failed to parse identity response: {err}"),
            )
        })?;

        if !status.is_success() {
            return Err(AuthError::from_error_body(status, &payload));
        }
        serde_json::from_value(payload).map_err(|err| {
            AuthError::new(
                AuthErrorKind::Api,
                format!("Unexpected identity response shape: {err}"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer, dir: &tempfile::TempDir) -> AuthClient {
        let backend = BackendConfig {
            auth_url: server.uri(),
            store_url: server.uri(),
            api_key: None,
        };
        AuthClient::new(&backend, dir.path().join("session.json"))
    }

    fn account_body() -> serde_json::Value {
        json!({
            "localId": "u1",
            "email": "user@example.com",
            "emailVerified": false,
            "idToken": "tok-1"
        })
    }

    fn error_body(code: &str) -> serde_json::Value {
        json!({ "error": { "message": code } })
    }

    #[tokio::test]
    async fn sign_in_publishes_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .and(body_partial_json(json!({ "email": "user@example.com" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(account_body()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let auth = client(&server, &dir);
        let rx = auth.subscribe();

        let session = auth.sign_in("user@example.com", "secret1").await.unwrap();
        assert_eq!(session.uid, "u1");
        assert_eq!(
            rx.borrow().session().map(|s| s.id_token.clone()),
            Some("tok-1".to_string())
        );
        assert!(dir.path().join("session.json").exists());
    }

    #[tokio::test]
    async fn sign_in_maps_invalid_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(error_body("INVALID_LOGIN_CREDENTIALS")),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let auth = client(&server, &dir);
        let rx = auth.subscribe();

        let err = auth.sign_in("user@example.com", "wrong1").await.unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::InvalidCredential);
        // Failed sign-in must not emit a notification.
        assert_eq!(*rx.borrow(), SessionState::Unknown);
    }

    #[tokio::test]
    async fn sign_up_does_not_publish() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signUp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(account_body()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let auth = client(&server, &dir);
        let rx = auth.subscribe();

        auth.sign_up("user@example.com", "secret1").await.unwrap();
        assert_eq!(*rx.borrow(), SessionState::Unknown);
        assert!(!dir.path().join("session.json").exists());
    }

    #[tokio::test]
    async fn sign_up_maps_email_exists() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signUp"))
            .respond_with(ResponseTemplate::new(400).set_body_json(error_body("EMAIL_EXISTS")))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let auth = client(&server, &dir);
        let err = auth.sign_up("user@example.com", "secret1").await.unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::EmailAlreadyInUse);
    }

    #[tokio::test]
    async fn reset_maps_user_not_found_and_unknown_codes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:sendOobCode"))
            .and(body_partial_json(json!({ "email": "ghost@example.com" })))
            .respond_with(ResponseTemplate::new(400).set_body_json(error_body("EMAIL_NOT_FOUND")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:sendOobCode"))
            .and(body_partial_json(json!({ "email": "user@example.com" })))
            .respond_with(ResponseTemplate::new(503).set_body_json(error_body("BACKEND_DOWN")))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let auth = client(&server, &dir);

        let err = auth.send_password_reset("ghost@example.com").await.unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::UserNotFound);

        // Unknown codes surface verbatim as generic API errors.
        let err = auth.send_password_reset("user@example.com").await.unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::Api);
        assert_eq!(err.message, "BACKEND_DOWN");
    }

    #[tokio::test]
    async fn sign_out_notifies_subscribers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(ResponseTemplate::new(200).set_body_json(account_body()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let auth = client(&server, &dir);
        let rx = auth.subscribe();

        auth.sign_in("user@example.com", "secret1").await.unwrap();
        auth.sign_out().unwrap();
        assert_eq!(*rx.borrow(), SessionState::SignedOut);
        assert!(!dir.path().join("session.json").exists());
    }
}
