//! Error types for the channel client

use chess::DecodeError;
use serde_json::Value;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Join rejected for {topic}: {reason}")]
    JoinRejected { topic: String, reason: Value },

    #[error("Request '{event}' rejected: {reason}")]
    Rejected { event: String, reason: Value },

    #[error("Request '{0}' timed out")]
    Timeout(String),

    #[error("Failed to encode frame: {0}")]
    Encode(String),

    #[error("Channel closed")]
    Closed,

    #[error("Push events already subscribed")]
    AlreadySubscribed,

    #[error("Server returned invalid data: {0}")]
    InvalidData(#[from] DecodeError),

    #[error("Mock response not configured for: {0}")]
    NotConfigured(String),
}

impl ClientError {
    /// Human readable reason the server gave, if it gave one.
    pub fn server_reason(&self) -> Option<String> {
        let reason = match self {
            Self::Rejected { reason, .. } | Self::JoinRejected { reason, .. } => reason,
            _ => return None,
        };
        match reason {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => ["reason", "message", "error"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::to_string)
                .or_else(|| Some(reason.to_string())),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_reason_prefers_reason_field() {
        let err = ClientError::Rejected {
            event: "make_move".into(),
            reason: json!({"reason": "not your turn"}),
        };
        assert_eq!(err.server_reason().as_deref(), Some("not your turn"));
    }

    #[test]
    fn server_reason_for_plain_string() {
        let err = ClientError::Rejected {
            event: "resign".into(),
            reason: json!("game already over"),
        };
        assert_eq!(err.server_reason().as_deref(), Some("game already over"));
    }

    #[test]
    fn transport_errors_have_no_server_reason() {
        assert_eq!(ClientError::Closed.server_reason(), None);
    }
}
