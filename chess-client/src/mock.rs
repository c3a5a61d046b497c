//! Mock Transport implementation for testing

use crate::error::{ClientError, ClientResult};
use crate::traits::{Inbound, Transport};
use async_trait::async_trait;
use chess::{GameState, Move};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Notify};

type Responder = Box<dyn Fn(&Value) -> ClientResult<Value> + Send>;

/// Mock transport for testing - only compiled in test mode or with mock feature.
///
/// Cloning shares the same scripted responses, call log and push stream, so
/// a test can keep a clone to inject pushes after handing one to a session.
#[derive(Clone)]
pub struct MockTransport {
    responses: Arc<Mutex<MockResponses>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
    gates: Arc<Mutex<HashMap<String, Arc<Notify>>>>,
    inbound_tx: Arc<Mutex<Option<mpsc::UnboundedSender<Inbound>>>>,
    inbound_rx: Arc<Mutex<Option<mpsc::UnboundedReceiver<Inbound>>>>,
    topic: Arc<Mutex<Option<String>>>,
}

#[derive(Default)]
struct MockResponses {
    join: Option<Responder>,
    pushes: HashMap<String, Responder>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Join { topic: String, payload: Value },
    Push { event: String, payload: Value },
}

/// Holds back replies for one event until released.
#[derive(Clone)]
pub struct ReplyGate(Arc<Notify>);

impl ReplyGate {
    /// Let the next held request through.
    pub fn release(&self) {
        self.0.notify_one();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            responses: Arc::new(Mutex::new(MockResponses::default())),
            call_log: Arc::new(Mutex::new(Vec::new())),
            gates: Arc::new(Mutex::new(HashMap::new())),
            inbound_tx: Arc::new(Mutex::new(Some(tx))),
            inbound_rx: Arc::new(Mutex::new(Some(rx))),
            topic: Arc::new(Mutex::new(None)),
        }
    }

    /// Configure the join reply
    pub fn with_join_response<F>(self, f: F) -> Self
    where
        F: Fn(&Value) -> ClientResult<Value> + Send + 'static,
    {
        self.responses.lock().unwrap().join = Some(Box::new(f));
        self
    }

    /// Configure the reply for a pushed request event
    pub fn with_response<F>(self, event: &str, f: F) -> Self
    where
        F: Fn(&Value) -> ClientResult<Value> + Send + 'static,
    {
        self.responses
            .lock()
            .unwrap()
            .pushes
            .insert(event.to_string(), Box::new(f));
        self
    }

    /// Replace the reply for `event` on an already shared transport.
    pub fn set_response<F>(&self, event: &str, f: F)
    where
        F: Fn(&Value) -> ClientResult<Value> + Send + 'static,
    {
        self.responses
            .lock()
            .unwrap()
            .pushes
            .insert(event.to_string(), Box::new(f));
    }

    /// Reply to `get_game_state` with `state`, JSON-encoded like the server does
    pub fn with_game_state(self, state: GameState) -> Self {
        let encoded = serde_json::to_string(&state).unwrap();
        self.with_response("get_game_state", move |_| Ok(Value::String(encoded.clone())))
    }

    /// Reply to `get_valid_moves` with `moves`, each JSON-encoded
    pub fn with_valid_moves(self, moves: Vec<Move>) -> Self {
        let encoded: Vec<Value> = moves
            .iter()
            .map(|mv| Value::String(serde_json::to_string(mv).unwrap()))
            .collect();
        self.with_response("get_valid_moves", move |_| Ok(Value::Array(encoded.clone())))
    }

    /// Ack every fire-and-forget request with an empty reply
    pub fn with_acks(self) -> Self {
        ["make_move", "request_draw", "accept_draw", "deny_draw", "resign"]
            .into_iter()
            .fold(self, |mock, event| mock.with_response(event, |_| Ok(json!({}))))
    }

    /// Pre-configure a room with the starting position and acks for all requests
    pub fn with_standard_game(self) -> Self {
        self.with_join_response(|_| Ok(json!({})))
            .with_game_state(GameState::starting_position())
            .with_acks()
    }

    /// Hold replies for `event` until the returned gate is released.
    pub fn gate(&self, event: &str) -> ReplyGate {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(event.to_string(), Arc::clone(&notify));
        ReplyGate(notify)
    }

    /// Deliver a server push on the joined topic.
    pub fn push_event(&self, event: &str, payload: Value) {
        let topic = self.topic.lock().unwrap().clone().unwrap_or_default();
        if let Some(tx) = self.inbound_tx.lock().unwrap().as_ref() {
            let _ = tx.send(Inbound {
                topic,
                event: event.to_string(),
                payload,
            });
        }
    }

    /// Deliver a `game_state_updated` push carrying `state`.
    pub fn push_game_state(&self, state: &GameState) {
        let encoded = serde_json::to_string(state).unwrap();
        self.push_event("game_state_updated", json!({ "game": encoded }));
    }

    /// End the push stream, as a dropped connection would.
    pub fn disconnect(&self) {
        self.inbound_tx.lock().unwrap().take();
    }

    /// Get recorded calls for verification
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Events of all recorded pushes, in order
    pub fn pushed_events(&self) -> Vec<String> {
        self.get_calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Push { event, .. } => Some(event),
                MockCall::Join { .. } => None,
            })
            .collect()
    }

    /// Clear call history
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn join(&self, topic: &str, payload: Value) -> ClientResult<Value> {
        self.call_log.lock().unwrap().push(MockCall::Join {
            topic: topic.to_string(),
            payload: payload.clone(),
        });

        let result = {
            let responses = self.responses.lock().unwrap();
            match responses.join {
                Some(ref f) => f(&payload),
                None => Err(ClientError::NotConfigured("phx_join".to_string())),
            }
        };
        if result.is_ok() {
            *self.topic.lock().unwrap() = Some(topic.to_string());
        }
        result
    }

    async fn push(&self, _topic: &str, event: &str, payload: Value) -> ClientResult<Value> {
        self.call_log.lock().unwrap().push(MockCall::Push {
            event: event.to_string(),
            payload: payload.clone(),
        });

        let gate = self.gates.lock().unwrap().get(event).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let responses = self.responses.lock().unwrap();
        match responses.pushes.get(event) {
            Some(f) => f(&payload),
            None => Err(ClientError::NotConfigured(event.to_string())),
        }
    }

    fn subscribe(&self) -> ClientResult<mpsc::UnboundedReceiver<Inbound>> {
        self.inbound_rx
            .lock()
            .unwrap()
            .take()
            .ok_or(ClientError::AlreadySubscribed)
    }
}
