//! Websocket transport speaking the Phoenix channels protocol.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::protocol::{reply_result, Frame, PHX_JOIN, VSN};
use crate::traits::{Inbound, Transport};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const OUTBOUND_CAPACITY: usize = 64;

type PendingReplies = Arc<Mutex<HashMap<String, oneshot::Sender<Frame>>>>;

/// Reply slot for one outstanding request. Dropping it (reply received,
/// send failed or the caller gave up) frees the slot.
struct PendingReply {
    pending: PendingReplies,
    msg_ref: String,
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(&self.msg_ref);
        }
    }
}

/// A connected Phoenix socket. Dropping it closes the connection.
pub struct PhoenixSocket {
    outbound: mpsc::Sender<String>,
    pending: PendingReplies,
    next_ref: AtomicU64,
    join_refs: std::sync::Mutex<HashMap<String, String>>,
    inbound: std::sync::Mutex<Option<mpsc::UnboundedReceiver<Inbound>>>,
    tasks: Vec<JoinHandle<()>>,
}

impl PhoenixSocket {
    /// Connect to `endpoint` (e.g. `ws://host/socket/websocket`), passing
    /// `params` as socket connect params.
    pub async fn connect(endpoint: &str, params: &[(&str, &str)]) -> ClientResult<Self> {
        let mut url =
            Url::parse(endpoint).map_err(|e| ClientError::InvalidAddress(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            query.append_pair("vsn", VSN);
        }

        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| ClientError::ConnectionFailed(e.to_string()))?;
        tracing::info!(endpoint = %endpoint, "Socket connected");

        let (mut write, mut read) = ws_stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(OUTBOUND_CAPACITY);
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<Inbound>();
        let pending: PendingReplies = Arc::new(Mutex::new(HashMap::new()));

        let writer = tokio::spawn(async move {
            while let Some(text) = outbound_rx.recv().await {
                if let Err(e) = write.send(Message::Text(text)).await {
                    tracing::error!("Failed to send frame: {}", e);
                    break;
                }
            }
            let _ = write.close().await;
        });

        let reader_pending = Arc::clone(&pending);
        let reader = tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                let text = match msg {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => {
                        tracing::info!("Server closed connection");
                        break;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::error!("Websocket error: {}", e);
                        break;
                    }
                };

                let frame = match Frame::decode(&text) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::warn!("Dropping undecodable frame: {}", e);
                        continue;
                    }
                };

                if frame.is_reply() {
                    let waiter = match frame.msg_ref.as_deref() {
                        Some(r) => reader_pending.lock().ok().and_then(|mut p| p.remove(r)),
                        None => None,
                    };
                    match waiter {
                        Some(tx) => {
                            let _ = tx.send(frame);
                        }
                        None => tracing::trace!(msg_ref = ?frame.msg_ref, "Unclaimed reply"),
                    }
                    continue;
                }

                if frame.closes(&frame.topic) {
                    tracing::warn!(topic = %frame.topic, event = %frame.event, "Channel closed by server");
                    break;
                }

                let inbound = Inbound {
                    topic: frame.topic,
                    event: frame.event,
                    payload: frame.payload,
                };
                if inbound_tx.send(inbound).is_err() {
                    tracing::debug!("Push receiver dropped");
                }
            }

            // Outstanding requests fail with `Closed` once their senders drop.
            let abandoned = match reader_pending.lock() {
                Ok(mut pending) => pending.drain().count(),
                Err(_) => 0,
            };
            tracing::info!(abandoned, "Socket reader finished");
        });

        let heartbeat_tx = outbound_tx.clone();
        let heartbeat = tokio::spawn(async move {
            let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);
            interval.tick().await;
            let mut beat: u64 = 0;
            loop {
                interval.tick().await;
                beat += 1;
                let text = match Frame::heartbeat(format!("hb-{}", beat)).encode() {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!("Skipping heartbeat: {}", e);
                        continue;
                    }
                };
                if heartbeat_tx.send(text).await.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            outbound: outbound_tx,
            pending,
            next_ref: AtomicU64::new(1),
            join_refs: std::sync::Mutex::new(HashMap::new()),
            inbound: std::sync::Mutex::new(Some(inbound_rx)),
            tasks: vec![writer, reader, heartbeat],
        })
    }

    fn make_ref(&self) -> String {
        self.next_ref.fetch_add(1, Ordering::Relaxed).to_string()
    }

    fn join_ref_for(&self, topic: &str) -> Option<String> {
        self.join_refs
            .lock()
            .ok()
            .and_then(|refs| refs.get(topic).cloned())
    }

    /// Send `frame` and wait for its `phx_reply`.
    ///
    /// Cancel safe: dropping the future releases the reply slot.
    async fn round_trip(&self, frame: Frame) -> ClientResult<Value> {
        let msg_ref = frame.msg_ref.clone().ok_or(ClientError::Closed)?;
        let text = frame.encode()?;

        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .map_err(|_| ClientError::Closed)?
            .insert(msg_ref.clone(), tx);
        let _slot = PendingReply {
            pending: Arc::clone(&self.pending),
            msg_ref,
        };

        self.outbound
            .send(text)
            .await
            .map_err(|_| ClientError::Closed)?;

        let reply = rx.await.map_err(|_| ClientError::Closed)?;
        Ok(reply.payload)
    }

    #[cfg(test)]
    fn pending_replies(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Transport for PhoenixSocket {
    async fn join(&self, topic: &str, payload: Value) -> ClientResult<Value> {
        let join_ref = self.make_ref();
        let frame = Frame::new(topic, PHX_JOIN, payload)
            .with_ref(join_ref.clone())
            .with_join_ref(Some(join_ref.clone()));

        let reply = self.round_trip(frame).await?;
        match reply_result(reply) {
            Ok(response) => {
                if let Ok(mut refs) = self.join_refs.lock() {
                    refs.insert(topic.to_string(), join_ref);
                }
                tracing::info!(topic = %topic, "Joined channel");
                Ok(response)
            }
            Err(reason) => Err(ClientError::JoinRejected {
                topic: topic.to_string(),
                reason,
            }),
        }
    }

    async fn push(&self, topic: &str, event: &str, payload: Value) -> ClientResult<Value> {
        let frame = Frame::new(topic, event, payload)
            .with_ref(self.make_ref())
            .with_join_ref(self.join_ref_for(topic));

        let reply = self.round_trip(frame).await?;
        reply_result(reply).map_err(|reason| ClientError::Rejected {
            event: event.to_string(),
            reason,
        })
    }

    fn subscribe(&self) -> ClientResult<mpsc::UnboundedReceiver<Inbound>> {
        self.inbound
            .lock()
            .ok()
            .and_then(|mut rx| rx.take())
            .ok_or(ClientError::AlreadySubscribed)
    }
}

impl Drop for PhoenixSocket {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
