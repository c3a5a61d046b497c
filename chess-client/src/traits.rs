//! Transport trait abstraction for channel implementations

use crate::error::ClientResult;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

/// An unsolicited server-to-client message on a joined topic.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub topic: String,
    pub event: String,
    pub payload: Value,
}

/// Bidirectional messaging channel.
/// Implemented by both the websocket `PhoenixSocket` and `MockTransport`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Join `topic`, returning the server's join reply.
    async fn join(&self, topic: &str, payload: Value) -> ClientResult<Value>;

    /// Push a request on `topic` and await exactly one reply.
    async fn push(&self, topic: &str, event: &str, payload: Value) -> ClientResult<Value>;

    /// Take the stream of inbound pushes. Can only be taken once; the stream
    /// ends when the connection is lost or the channel is closed by the server.
    fn subscribe(&self) -> ClientResult<mpsc::UnboundedReceiver<Inbound>>;
}
