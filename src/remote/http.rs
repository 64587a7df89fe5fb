//! HTTP-backed remote mirror.
//!
//! The mirror is one document endpoint: `GET` returns the full record
//! array (404 or `null` body when the document does not exist yet) and
//! `PUT` replaces it atomically. Any transport or auth failure maps to
//! [`Error::Unreachable`]; the collection data itself never produces it.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::{Mirror, RemoteSnapshot, snapshot_fingerprint};
use crate::error::{Error, Result};
use crate::model::Record;

/// Default interval between subscription polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Remote mirror over a single HTTP document endpoint.
#[derive(Debug, Clone)]
pub struct HttpMirror {
    client: reqwest::Client,
    url: String,
    poll_interval: Duration,
}

impl HttpMirror {
    /// Create a mirror for the given document URL.
    #[must_use]
    pub fn new(url: String) -> Self {
        Self::with_poll_interval(url, DEFAULT_POLL_INTERVAL)
    }

    /// Create a mirror with a custom subscription poll interval.
    #[must_use]
    pub fn with_poll_interval(url: String, poll_interval: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            poll_interval,
        }
    }

    /// The document URL this mirror talks to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<RemoteSnapshot> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Unreachable(e.to_string()))?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !response.status().is_success() {
        return Err(Error::Unreachable(format!(
            "remote returned {}",
            response.status()
        )));
    }

    // A missing document may also come back as a JSON `null` body.
    let snapshot: RemoteSnapshot = response
        .json()
        .await
        .map_err(|e| Error::Unreachable(e.to_string()))?;
    Ok(snapshot)
}

impl Mirror for HttpMirror {
    fn is_configured(&self) -> bool {
        true
    }

    async fn pull(&self) -> Result<RemoteSnapshot> {
        fetch(&self.client, &self.url).await
    }

    async fn push(&self, records: &[Record]) -> Result<()> {
        let response = self
            .client
            .put(&self.url)
            .json(&records)
            .send()
            .await
            .map_err(|e| Error::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Unreachable(format!(
                "remote returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Poll-based subscription.
    ///
    /// A background task fetches the document on an interval and sends a
    /// new value only when the snapshot fingerprint changes. Poll failures
    /// are logged at debug level and the loop keeps going, so transient
    /// disconnects resume silently. The task exits once the receiver is
    /// dropped.
    fn subscribe(&self) -> watch::Receiver<RemoteSnapshot> {
        let (tx, rx) = watch::channel(None);
        let client = self.client.clone();
        let url = self.url.clone();
        let every = self.poll_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last_fingerprint: Option<String> = None;

            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    break;
                }
                poll_step(&client, &url, &mut last_fingerprint, &tx).await;
            }
        });

        rx
    }
}

/// One subscription poll: fetch, compare fingerprints, notify on change.
///
/// A failed fetch leaves `last_fingerprint` untouched and sends nothing, so
/// the next successful poll resumes exactly where the last one left off.
async fn poll_step(
    client: &reqwest::Client,
    url: &str,
    last_fingerprint: &mut Option<String>,
    tx: &watch::Sender<RemoteSnapshot>,
) {
    match fetch(client, url).await {
        Ok(snapshot) => {
            let fingerprint = snapshot.as_deref().map(snapshot_fingerprint);
            if *last_fingerprint != fingerprint {
                *last_fingerprint = fingerprint;
                let _ = tx.send(snapshot);
            }
        }
        Err(e) => {
            debug!(error = %e, "mirror poll failed; retrying on next tick");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MediaKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn record(id: i64, caption: &str) -> Record {
        Record {
            id,
            kind: MediaKind::Photo,
            category: "together".to_string(),
            data: "d".to_string(),
            caption: caption.to_string(),
            timestamp: id,
            size: 1,
        }
    }

    /// Serve one HTTP response with the given JSON body, then close.
    async fn serve_once(body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{addr}/memories.json")
    }

    // Nothing listens on the discard port, so the connection is refused.
    const DEAD_URL: &str = "http://127.0.0.1:9/memories.json";

    #[tokio::test]
    async fn failed_poll_keeps_fingerprint_and_sends_nothing() {
        let client = reqwest::Client::new();
        let (tx, mut rx) = watch::channel(None);
        let mut last = Some("sentinel".to_string());

        poll_step(&client, DEAD_URL, &mut last, &tx).await;

        assert_eq!(last.as_deref(), Some("sentinel"));
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn poll_resumes_after_a_failure() {
        let client = reqwest::Client::new();
        let (tx, mut rx) = watch::channel(None);
        let mut last = None;

        poll_step(&client, DEAD_URL, &mut last, &tx).await;
        assert!(last.is_none());
        assert!(!rx.has_changed().unwrap());

        let snapshot = vec![record(1, "back online")];
        let url = serve_once(serde_json::to_string(&snapshot).unwrap()).await;
        poll_step(&client, &url, &mut last, &tx).await;

        assert_eq!(last, Some(snapshot_fingerprint(&snapshot)));
        assert!(rx.has_changed().unwrap());
        let received = rx.borrow_and_update().clone().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].caption, "back online");
    }

    #[tokio::test]
    async fn unchanged_snapshot_is_not_re_sent() {
        let client = reqwest::Client::new();
        let (tx, mut rx) = watch::channel(None);
        let snapshot = vec![record(1, "a"), record(2, "b")];
        let mut last = Some(snapshot_fingerprint(&snapshot));

        // Same records in a different order fingerprint identically.
        let reordered = vec![record(2, "b"), record(1, "a")];
        let url = serve_once(serde_json::to_string(&reordered).unwrap()).await;
        poll_step(&client, &url, &mut last, &tx).await;

        assert!(!rx.has_changed().unwrap());
    }
}
