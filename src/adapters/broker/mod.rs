//! Device bridge: an embedded publish/subscribe broker plus the subscriber
//! that feeds scan events into the dispatcher.
//!
//! Field devices speak a line protocol over plain TCP:
//!
//! ```text
//! SUB <topic>
//! PUB <topic> <payload>
//! ```
//!
//! and receive `MSG <topic> <payload>` lines for topics they subscribed
//! to. Any topic may be published or subscribed; only the configured scan
//! topic is bridged into the message pipeline, fire-and-forget (no reply
//! sink), re-tagged as a `BrokerItemRead.Create` envelope.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;

use crate::dispatch::{Envelope, MessageDispatcher};

/// Buffered publications per topic before slow subscribers start lagging.
const TOPIC_BUFFER: usize = 256;

/// Topic-keyed fan-out. Cheap to clone; all clones share the topic map.
#[derive(Clone, Default)]
pub struct DeviceBroker {
    topics: Arc<RwLock<HashMap<String, broadcast::Sender<String>>>>,
}

impl DeviceBroker {
    pub fn new() -> Self {
        Self::default()
    }

    async fn topic(&self, name: &str) -> broadcast::Sender<String> {
        if let Some(tx) = self.topics.read().await.get(name) {
            return tx.clone();
        }
        let mut topics = self.topics.write().await;
        topics
            .entry(name.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_BUFFER).0)
            .clone()
    }

    /// Deliver a payload to everyone subscribed to `topic`.
    pub async fn publish(&self, topic: &str, payload: &str) {
        let tx = self.topic(topic).await;
        // A send error only means nobody is subscribed right now.
        let delivered = tx.send(payload.to_string()).unwrap_or(0);
        tracing::debug!(topic, delivered, "publication");
    }

    /// Subscribe to a topic, creating it on first use.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<String> {
        self.topic(topic).await.subscribe()
    }

    /// Accept device connections forever.
    pub async fn serve(self, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    tracing::info!(%addr, "device connected");
                    let broker = self.clone();
                    tokio::spawn(async move {
                        if let Err(err) = handle_device(broker, stream).await {
                            tracing::debug!(%addr, %err, "device connection ended");
                        }
                    });
                }
                Err(err) => {
                    tracing::warn!(%err, "broker accept failed");
                }
            }
        }
    }
}

async fn handle_device(broker: DeviceBroker, stream: TcpStream) -> std::io::Result<()> {
    let (read_half, write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    // One writer task per connection; SUB forwarders feed it.
    let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(write_lines(write_half, out_rx));

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once(' ') {
            Some(("SUB", topic)) => {
                let topic = topic.trim().to_string();
                tracing::info!(%topic, "device subscribed");
                let mut rx = broker.subscribe(&topic).await;
                let out = out_tx.clone();
                tokio::spawn(async move {
                    loop {
                        match rx.recv().await {
                            Ok(payload) => {
                                if out.send(format!("MSG {topic} {payload}")).is_err() {
                                    break;
                                }
                            }
                            Err(broadcast::error::RecvError::Lagged(missed)) => {
                                tracing::warn!(%topic, missed, "subscriber lagged");
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                });
            }
            Some(("PUB", rest)) => {
                let (topic, payload) = rest.split_once(' ').unwrap_or((rest, ""));
                broker.publish(topic.trim(), payload).await;
            }
            _ => tracing::debug!(line, "ignoring unknown broker command"),
        }
    }

    writer.abort();
    Ok(())
}

async fn write_lines(
    mut write_half: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<String>,
) {
    while let Some(mut line) = rx.recv().await {
        line.push('\n');
        if write_half.write_all(line.as_bytes()).await.is_err() {
            break;
        }
    }
}

/// Subscribe to the scan topic and forward each publication into the
/// dispatcher with no reply sink.
pub fn spawn_bridge(
    broker: DeviceBroker,
    dispatcher: MessageDispatcher,
    scan_topic: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rx = broker.subscribe(&scan_topic).await;
        tracing::info!(topic = %scan_topic, "bridge subscribed to scan topic");
        loop {
            match rx.recv().await {
                Ok(payload) => match retag_scan(&payload) {
                    Some(raw) => dispatcher.enqueue(raw, None),
                    None => {
                        tracing::warn!(topic = %scan_topic, "scan publication had no JSON")
                    }
                },
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(topic = %scan_topic, missed, "bridge lagged, scans lost");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Re-envelope a device publication as a `BrokerItemRead.Create` job.
///
/// Devices either send a full envelope or a bare payload object like
/// `{"tagId":"...","readTime":"..."}`; both become the same routing-tagged
/// message.
fn retag_scan(publication: &str) -> Option<String> {
    let brace = publication.find('{')?;
    let root: Value = serde_json::from_str(publication[brace..].trim()).ok()?;
    let payload = match root.get("payload") {
        Some(inner) => inner.clone(),
        None => root,
    };
    Some(Envelope::build("BrokerItemRead.Create", payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retag_wraps_bare_payload() {
        let raw = retag_scan(r#"{"tagId":"TAG-1","readTime":"2026-01-01T00:00:00Z"}"#).unwrap();
        let env = Envelope::parse(&raw).unwrap();
        assert_eq!(env.msg_type, "BrokerItemRead.Create");
        assert_eq!(env.payload["tagId"], "TAG-1");
    }

    #[test]
    fn retag_unwraps_full_envelope() {
        let raw = retag_scan(
            r#"ItemRead.Create
{"type":"ItemRead.Create","payload":{"tagId":"TAG-2"}}"#,
        )
        .unwrap();
        let env = Envelope::parse(&raw).unwrap();
        assert_eq!(env.msg_type, "BrokerItemRead.Create");
        assert_eq!(env.payload["tagId"], "TAG-2");
    }

    #[test]
    fn retag_rejects_non_json() {
        assert!(retag_scan("beep boop").is_none());
    }

    #[tokio::test]
    async fn publish_reaches_subscriber() {
        let broker = DeviceBroker::new();
        let mut rx = broker.subscribe("scans").await;
        broker.publish("scans", r#"{"tagId":"T"}"#).await;
        assert_eq!(rx.recv().await.unwrap(), r#"{"tagId":"T"}"#);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_harmless() {
        let broker = DeviceBroker::new();
        broker.publish("empty-topic", "x").await;
    }
}
