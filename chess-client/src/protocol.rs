//! Phoenix channels v2 JSON framing.
//!
//! Every frame is a five element array:
//! `[join_ref, ref, topic, event, payload]`.

use serde_json::{json, Value};

use crate::error::{ClientError, ClientResult};

pub const PHX_JOIN: &str = "phx_join";
pub const PHX_REPLY: &str = "phx_reply";
pub const PHX_ERROR: &str = "phx_error";
pub const PHX_CLOSE: &str = "phx_close";
pub const HEARTBEAT: &str = "heartbeat";
pub const PHOENIX_TOPIC: &str = "phoenix";

/// Serializer version requested in the socket URL.
pub const VSN: &str = "2.0.0";

type RawFrame = (Option<String>, Option<String>, String, String, Value);

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub join_ref: Option<String>,
    pub msg_ref: Option<String>,
    pub topic: String,
    pub event: String,
    pub payload: Value,
}

impl Frame {
    pub fn new(topic: impl Into<String>, event: impl Into<String>, payload: Value) -> Self {
        Self {
            join_ref: None,
            msg_ref: None,
            topic: topic.into(),
            event: event.into(),
            payload,
        }
    }

    pub fn with_ref(mut self, msg_ref: impl Into<String>) -> Self {
        self.msg_ref = Some(msg_ref.into());
        self
    }

    pub fn with_join_ref(mut self, join_ref: Option<String>) -> Self {
        self.join_ref = join_ref;
        self
    }

    pub fn heartbeat(msg_ref: impl Into<String>) -> Self {
        Self::new(PHOENIX_TOPIC, HEARTBEAT, json!({})).with_ref(msg_ref)
    }

    pub fn encode(&self) -> ClientResult<String> {
        let raw: RawFrame = (
            self.join_ref.clone(),
            self.msg_ref.clone(),
            self.topic.clone(),
            self.event.clone(),
            self.payload.clone(),
        );
        serde_json::to_string(&raw).map_err(|e| ClientError::Encode(e.to_string()))
    }

    pub fn decode(text: &str) -> ClientResult<Self> {
        let (join_ref, msg_ref, topic, event, payload): RawFrame =
            serde_json::from_str(text).map_err(|e| ClientError::InvalidData(e.into()))?;
        Ok(Self {
            join_ref,
            msg_ref,
            topic,
            event,
            payload,
        })
    }

    pub fn is_reply(&self) -> bool {
        self.event == PHX_REPLY
    }

    /// Whether this frame tears down the channel on `topic`.
    pub fn closes(&self, topic: &str) -> bool {
        self.topic == topic && (self.event == PHX_ERROR || self.event == PHX_CLOSE)
    }
}

/// Split a `phx_reply` payload into the ok response or the error response.
pub fn reply_result(payload: Value) -> Result<Value, Value> {
    let mut payload = payload;
    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("error")
        .to_string();
    let response = payload
        .get_mut("response")
        .map(Value::take)
        .unwrap_or(Value::Null);

    if status == "ok" {
        Ok(response)
    } else {
        Err(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_as_five_element_array() {
        let frame = Frame::new("room:abc", "get_game_state", json!({}))
            .with_ref("3")
            .with_join_ref(Some("1".into()));
        assert_eq!(
            frame.encode().unwrap(),
            r#"["1","3","room:abc","get_game_state",{}]"#
        );
    }

    #[test]
    fn heartbeat_targets_phoenix_topic() {
        let text = Frame::heartbeat("hb-1").encode().unwrap();
        assert_eq!(text, r#"[null,"hb-1","phoenix","heartbeat",{}]"#);
    }

    #[test]
    fn decodes_push_without_refs() {
        let frame =
            Frame::decode(r#"[null,null,"room:abc","draw_requested",{"role":"black"}]"#).unwrap();
        assert_eq!(frame.join_ref, None);
        assert_eq!(frame.event, "draw_requested");
        assert_eq!(frame.payload["role"], "black");
    }

    #[test]
    fn malformed_frame_is_invalid_data() {
        assert!(matches!(
            Frame::decode(r#"{"event":"x"}"#),
            Err(ClientError::InvalidData(_))
        ));
    }

    #[test]
    fn reply_result_splits_status() {
        let ok = reply_result(json!({"status": "ok", "response": "done"}));
        assert_eq!(ok, Ok(json!("done")));

        let err = reply_result(json!({"status": "error", "response": {"reason": "illegal"}}));
        assert_eq!(err, Err(json!({"reason": "illegal"})));
    }

    #[test]
    fn error_frames_close_only_their_topic() {
        let frame = Frame::new("room:abc", PHX_ERROR, json!({}));
        assert!(frame.closes("room:abc"));
        assert!(!frame.closes("room:other"));
    }
}
