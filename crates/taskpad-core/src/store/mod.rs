//! Document store client.
//!
//! Persists and streams the per-user record collection. The client
//! consumes four operations: a standing full-snapshot subscription plus
//! one-shot add / update / delete mutations. The local view built from
//! the subscription is a pure projection; the store remains the only
//! source of truth, so mutations never touch local state directly.

mod sse;

use std::fmt;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::auth::Session;
use crate::config::BackendConfig;

/// A single to-do item owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Store-assigned, immutable.
    pub id: String,
    pub title: String,
    pub completed: bool,
    /// Assigned by the store at write time; the display order key.
    pub created_at: DateTime<Utc>,
}

/// Error category for document store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// HTTP status error (4xx, 5xx).
    Http,
    /// Connection or transport failure.
    Network,
    /// Failed to decode a response or stream event.
    Parse,
}

/// Error returned by document store operations.
#[derive(Debug, Clone)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    /// One-line summary suitable for display.
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn network(err: &reqwest::Error) -> Self {
        Self::new(StoreErrorKind::Network, format!("Request failed: {err}"))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StoreError {}

/// A standing subscription to one user's collection.
///
/// Each received value is a full snapshot, already ordered by creation
/// time descending; a later snapshot supersedes an earlier one entirely.
/// Dropping the subscription cancels the feed task synchronously, so no
/// notification can be observed after teardown.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::Receiver<Vec<Record>>,
    cancel: CancellationToken,
}

impl Subscription {
    /// Builds a subscription from raw parts, for callers that need a feed
    /// handle without a live backend.
    pub fn from_parts(rx: mpsc::Receiver<Vec<Record>>, cancel: CancellationToken) -> Self {
        Self { rx, cancel }
    }

    /// Non-blocking poll for the next snapshot.
    ///
    /// # Errors
    /// Returns `TryRecvError::Empty` when no snapshot is pending and
    /// `TryRecvError::Disconnected` when the feed has ended.
    pub fn try_recv(&mut self) -> Result<Vec<Record>, mpsc::error::TryRecvError> {
        self.rx.try_recv()
    }

    /// Awaits the next snapshot; `None` when the feed has ended.
    pub async fn recv(&mut self) -> Option<Vec<Record>> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Document store client.
#[derive(Debug)]
pub struct StoreClient {
    base_url: String,
    http: reqwest::Client,
}

impl StoreClient {
    /// Creates a client for the configured document store.
    pub fn new(backend: &BackendConfig) -> Self {
        Self {
            base_url: backend.store_url.clone(),
            http: reqwest::Client::new(),
        }
    }

    fn collection_url(&self, uid: &str) -> String {
        format!("{}/v1/users/{uid}/todos", self.base_url)
    }

    /// Opens a standing snapshot subscription for the session's collection.
    ///
    /// Spawns the feed task immediately; snapshots arrive through the
    /// returned handle. There is no reconnect: a broken stream is logged
    /// and the handle reports disconnection.
    pub fn subscribe(&self, session: &Session) -> Subscription {
        let (tx, rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let http = self.http.clone();
        let url = format!("{}:watch", self.collection_url(&session.uid));
        let token = session.id_token.clone();

        let child = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = child.cancelled() => {}
                () = feed_snapshots(http, url, token, tx) => {}
            }
        });

        Subscription::from_parts(rx, cancel)
    }

    /// Adds a record with `completed = false`.
    ///
    /// The store assigns the id and creation timestamp; the new row
    /// reaches the caller only through the next subscription snapshot.
    ///
    /// # Errors
    /// Returns the mapped store error on rejection.
    pub async fn add(&self, session: &Session, title: &str) -> Result<String, StoreError> {
        let url = self.collection_url(&session.uid);
        let body = json!({ "title": title, "completed": false });
        let response = self
            .request_ok(
                self.http
                    .post(&url)
                    .bearer_auth(&session.id_token)
                    .json(&body),
            )
            .await?;
        let id = response
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| StoreError::new(StoreErrorKind::Parse, "Add response missing id"))?;
        Ok(id.to_string())
    }

    /// Sets a record's `completed` flag.
    ///
    /// # Errors
    /// Returns the mapped store error on rejection.
    pub async fn set_completed(
        &self,
        session: &Session,
        id: &str,
        completed: bool,
    ) -> Result<(), StoreError> {
        let url = format!("{}/{id}", self.collection_url(&session.uid));
        let body = json!({ "completed": completed });
        self.request_ok(
            self.http
                .patch(&url)
                .bearer_auth(&session.id_token)
                .json(&body),
        )
        .await?;
        Ok(())
    }

    /// Deletes a record.
    ///
    /// # Errors
    /// Returns the mapped store error on rejection.
    pub async fn delete(&self, session: &Session, id: &str) -> Result<(), StoreError> {
        let url = format!("{}/{id}", self.collection_url(&session.uid));
        self.request_ok(self.http.delete(&url).bearer_auth(&session.id_token))
            .await?;
        Ok(())
    }

    async fn request_ok(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|err| StoreError::network(&err))?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| {
                    v.get("error")
                        .and_then(|e| e.get("message"))
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| format!("Store returned HTTP {status}"));
            return Err(StoreError::new(StoreErrorKind::Http, message));
        }

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|err| {
            StoreError::new(
                StoreErrorKind::Parse,
                format!("Failed to parse store response: {err}"),
            )
        })
    }
}

/// Orders a snapshot by creation time descending (most recent first).
///
/// Applied to every snapshot as a guarantee independent of server
/// ordering. Ties break on id for a stable display order.
pub fn sort_snapshot(records: &mut [Record]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

async fn feed_snapshots(
    http: reqwest::Client,
    url: String,
    token: String,
    tx: mpsc::Sender<Vec<Record>>,
) {
    let response = match http.get(&url).bearer_auth(&token).send().await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!("watch request failed: {err}");
            return;
        }
    };
    if !response.status().is_success() {
        tracing::warn!("watch request rejected: HTTP {}", response.status());
        return;
    }

    let mut events = std::pin::pin!(sse::snapshot_events(response.bytes_stream()));
    while let Some(item) = events.next().await {
        match item {
            Ok(mut records) => {
                sort_snapshot(&mut records);
                if tx.send(records).await.is_err() {
                    break;
                }
            }
            Err(err) => {
                tracing::warn!("watch stream ended: {err}");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn session(server: &MockServer) -> (StoreClient, Session) {
        let backend = BackendConfig {
            auth_url: server.uri(),
            store_url: server.uri(),
            api_key: None,
        };
        let session = Session {
            uid: "u1".into(),
            email: "user@example.com".into(),
            email_verified: true,
            id_token: "tok-1".into(),
        };
        (StoreClient::new(&backend), session)
    }

    fn record(id: &str, ts: i64) -> Record {
        Record {
            id: id.into(),
            title: format!("item {id}"),
            completed: false,
            created_at: chrono::Utc.timestamp_opt(ts, 0).unwrap(),
        }
    }

    #[test]
    fn snapshots_order_most_recent_first() {
        let mut records = vec![record("a", 100), record("c", 300), record("b", 200)];
        sort_snapshot(&mut records);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }

    #[test]
    fn equal_timestamps_break_ties_on_id() {
        let mut records = vec![record("a", 100), record("b", 100)];
        sort_snapshot(&mut records);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[tokio::test]
    async fn add_sends_bearer_token_and_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/users/u1/todos"))
            .and(header("authorization", "Bearer tok-1"))
            .and(body_partial_json(
                serde_json::json!({ "title": "buy milk", "completed": false }),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "r1",
                "created_at": "2026-08-23T10:00:00Z"
            })))
            .mount(&server)
            .await;

        let (store, session) = session(&server);
        let id = store.add(&session, "buy milk").await.unwrap();
        assert_eq!(id, "r1");
    }

    #[tokio::test]
    async fn toggle_and_delete_hit_the_record_path() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v1/users/u1/todos/r1"))
            .and(body_partial_json(serde_json::json!({ "completed": true })))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v1/users/u1/todos/r1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let (store, session) = session(&server);
        store.set_completed(&session, "r1", true).await.unwrap();
        store.delete(&session, "r1").await.unwrap();
    }

    #[tokio::test]
    async fn rejected_mutation_surfaces_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/users/u1/todos/r1"))
            .respond_with(ResponseTemplate::new(403).set_body_json(
                serde_json::json!({ "error": { "message": "PERMISSION_DENIED" } }),
            ))
            .mount(&server)
            .await;

        let (store, session) = session(&server);
        let err = store.delete(&session, "r1").await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::Http);
        assert_eq!(err.message, "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn subscription_delivers_ordered_snapshots() {
        let server = MockServer::start().await;
        let body = concat!(
            "event: snapshot\n",
            "data: [",
            "{\"id\":\"a\",\"title\":\"oldest\",\"completed\":false,\"created_at\":\"2026-08-23T08:00:00Z\"},",
            "{\"id\":\"c\",\"title\":\"newest\",\"completed\":false,\"created_at\":\"2026-08-23T10:00:00Z\"},",
            "{\"id\":\"b\",\"title\":\"middle\",\"completed\":true,\"created_at\":\"2026-08-23T09:00:00Z\"}",
            "]\n\n",
        );
        Mock::given(method("GET"))
            .and(path("/v1/users/u1/todos:watch"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_raw(body, "text/event-stream"),
            )
            .mount(&server)
            .await;

        let (store, session) = session(&server);
        let mut sub = store.subscribe(&session);
        let snapshot = sub.recv().await.expect("one snapshot");
        let ids: Vec<_> = snapshot.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
        // Stream ends after the body; the feed disconnects cleanly.
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn dropping_the_subscription_cancels_the_feed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/users/u1/todos:watch"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_raw("event: snapshot\ndata: []\n\n", "text/event-stream")
                    .set_delay(std::time::Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let (store, session) = session(&server);
        let sub = store.subscribe(&session);
        let cancel = sub.cancel.clone();
        drop(sub);
        // Cancellation is synchronous with drop.
        assert!(cancel.is_cancelled());
    }
}
