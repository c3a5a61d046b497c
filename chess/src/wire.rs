//! Decoding of payloads that arrive as JSON-encoded strings.
//!
//! The server encodes game documents (`GameState`, `Move`) as JSON text
//! nested inside the channel payload. Inline objects are accepted too.

use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Malformed JSON: {0}")]
    Json(String),
    #[error("Board must have 64 cells, got {0}")]
    BoardLength(usize),
    #[error("Square index out of range: {0}")]
    SquareOutOfRange(i64),
    #[error("Expected a JSON-encoded document, got {0}")]
    UnexpectedShape(&'static str),
    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

/// Decode a document that is either a JSON string holding the encoded
/// document or the document itself.
pub fn decode_embedded<T: DeserializeOwned>(value: Value) -> Result<T, DecodeError> {
    match value {
        Value::String(text) => Ok(serde_json::from_str(&text)?),
        Value::Object(_) => Ok(serde_json::from_value(value)?),
        other => Err(DecodeError::UnexpectedShape(shape_name(&other))),
    }
}

/// Decode a list whose elements are each embedded documents.
pub fn decode_embedded_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, DecodeError> {
    match value {
        Value::Array(items) => items.into_iter().map(decode_embedded).collect(),
        other => Err(DecodeError::UnexpectedShape(shape_name(&other))),
    }
}

/// Take a required field out of an object payload.
pub fn take_field(value: &mut Value, field: &'static str) -> Result<Value, DecodeError> {
    value
        .get_mut(field)
        .map(Value::take)
        .filter(|v| !v.is_null())
        .ok_or(DecodeError::MissingField(field))
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameState, Move, Square};
    use serde_json::json;

    #[test]
    fn decodes_string_encoded_game_state() {
        let encoded = serde_json::to_string(&GameState::starting_position()).unwrap();
        let state: GameState = decode_embedded(Value::String(encoded)).unwrap();
        assert_eq!(state, GameState::starting_position());
    }

    #[test]
    fn decodes_list_of_encoded_moves() {
        let value = json!([r#"{"from":12,"to":20}"#, {"from": 12, "to": 28, "promote_to": null}]);
        let moves: Vec<Move> = decode_embedded_list(value).unwrap();
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[1].to, Square::new(28).unwrap());
    }

    #[test]
    fn rejects_numbers_as_documents() {
        let result: Result<GameState, _> = decode_embedded(json!(42));
        assert_eq!(result, Err(DecodeError::UnexpectedShape("number")));
    }

    #[test]
    fn short_board_surfaces_as_decode_error() {
        let result: Result<GameState, _> =
            decode_embedded(json!({"board": [null, null], "turn": "white"}));
        assert!(matches!(result, Err(DecodeError::Json(msg)) if msg.contains("64")));
    }

    #[test]
    fn take_field_treats_null_as_missing() {
        let mut payload = json!({"game": null});
        assert_eq!(
            take_field(&mut payload, "game"),
            Err(DecodeError::MissingField("game"))
        );
    }
}
