use chess::{Move, Square};
use chess_client::{ClientError, Request};
use thiserror::Error;

use crate::view::Notification;

/// Fatal session errors, surfaced before any UI is shown.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to join {topic}: {source}")]
    Join { topic: String, source: ClientError },

    #[error("Failed to fetch initial game state: {0}")]
    InitialState(#[source] ClientError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Recoverable errors. Reported to the user; the state machine stays `Idle`.
#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("Could not load moves for {square}: {source}")]
    QueryFailed { square: Square, source: ClientError },

    #[error("Move {mv} rejected: {source}")]
    MoveRejected { mv: Move, source: ClientError },

    #[error("Request '{event}' failed: {source}")]
    RequestFailed {
        event: &'static str,
        source: ClientError,
    },
}

impl InteractionError {
    /// Classify a failed fire-and-forget request.
    pub fn from_request(request: Request, source: ClientError) -> Self {
        match request {
            Request::MakeMove(mv) => Self::MoveRejected { mv, source },
            Request::GetValidMoves { from } => Self::QueryFailed {
                square: from,
                source,
            },
            other => Self::RequestFailed {
                event: other.event(),
                source,
            },
        }
    }

    pub fn source_error(&self) -> &ClientError {
        match self {
            Self::QueryFailed { source, .. }
            | Self::MoveRejected { source, .. }
            | Self::RequestFailed { source, .. } => source,
        }
    }

    pub fn notification(&self) -> Notification {
        let header = match self {
            Self::QueryFailed { square, .. } => format!("Cannot select {}", square),
            Self::MoveRejected { mv, .. } => format!("Move {} rejected", mv),
            Self::RequestFailed { event, .. } => format!("'{}' failed", event),
        };
        let source = self.source_error();
        let message = source.server_reason().unwrap_or_else(|| source.to_string());
        Notification::new(header, message)
    }
}
