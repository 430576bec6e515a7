//! SSE decoding for the collection watch stream.
//!
//! The watch endpoint emits `snapshot` events whose data is the full
//! collection as a JSON array. Anything else on the stream (comments,
//! keep-alive pings) is ignored.

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};

use super::{Record, StoreError, StoreErrorKind};

/// Converts a byte stream into a stream of decoded snapshots.
pub(super) fn snapshot_events<S, B, E>(
    bytes: S,
) -> impl Stream<Item = Result<Vec<Record>, StoreError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::error::Error,
{
    bytes.eventsource().filter_map(|item| async move {
        match item {
            Ok(event) => match event.event.as_str() {
                "snapshot" => Some(parse_snapshot(&event.data)),
                _ => None,
            },
            Err(err) => Some(Err(StoreError::new(
                StoreErrorKind::Parse,
                format!("SSE stream error: {err}"),
            ))),
        }
    })
}

/// Parses one snapshot payload (a JSON array of records).
pub(super) fn parse_snapshot(data: &str) -> Result<Vec<Record>, StoreError> {
    serde_json::from_str(data).map_err(|err| {
        StoreError::new(
            StoreErrorKind::Parse,
            format!("Failed to parse snapshot: {err}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use futures_util::stream;

    use super::*;

    fn chunks(body: &str) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> {
        // Split mid-event to exercise reassembly across chunk boundaries.
        let bytes = body.as_bytes().to_vec();
        let mid = bytes.len() / 2;
        let parts = vec![Ok(bytes[..mid].to_vec()), Ok(bytes[mid..].to_vec())];
        stream::iter(parts)
    }

    #[tokio::test]
    async fn decodes_snapshot_events_and_skips_pings() {
        let body = concat!(
            "event: ping\ndata: {}\n\n",
            "event: snapshot\n",
            "data: [{\"id\":\"a\",\"title\":\"first\",\"completed\":false,",
            "\"created_at\":\"2026-08-23T10:00:00Z\"}]\n\n",
            "event: snapshot\ndata: []\n\n",
        );

        let snapshots: Vec<_> = snapshot_events(chunks(body)).collect().await;
        assert_eq!(snapshots.len(), 2);
        let first = snapshots[0].as_ref().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "a");
        assert_eq!(first[0].title, "first");
        assert!(snapshots[1].as_ref().unwrap().is_empty());
    }

    #[test]
    fn malformed_payload_is_a_parse_error() {
        let err = parse_snapshot("{not json").unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::Parse);
    }
}
