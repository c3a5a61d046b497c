//! Typed request/reply and push API for a single game room.

use std::sync::Arc;
use std::time::Duration;

use chess::{decode_embedded, decode_embedded_list, take_field, Color, DecodeError, GameState, Move, Square};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::error::{ClientError, ClientResult};
use crate::traits::{Inbound, Transport};

pub const GAME_STATE_UPDATED: &str = "game_state_updated";
pub const GAME_OVER: &str = "game_over";
pub const DRAW_REQUESTED: &str = "draw_requested";

/// Whether the local participant plays or only watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerRole {
    #[default]
    Player,
    Spectator,
}

impl std::str::FromStr for PlayerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "player" => Ok(Self::Player),
            "spectator" => Ok(Self::Spectator),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Identity sent when joining a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinParams {
    pub game_code: String,
    pub color: Color,
    pub role: PlayerRole,
}

impl JoinParams {
    pub fn topic(&self) -> String {
        format!("room:{}", self.game_code)
    }

    /// Key/value pairs as stored client side and sent as socket params.
    pub fn as_pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("current_game_code", self.game_code.as_str()),
            ("current_game_color", self.color.as_str()),
            ("current_game_role", role_str(self.role)),
        ]
    }

    pub fn join_payload(&self) -> Value {
        let params: serde_json::Map<String, Value> = self
            .as_pairs()
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        json!({ "params": params })
    }
}

fn role_str(role: PlayerRole) -> &'static str {
    match role {
        PlayerRole::Player => "player",
        PlayerRole::Spectator => "spectator",
    }
}

/// Outbound requests and their payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    GetGameState,
    GetValidMoves { from: Square },
    MakeMove(Move),
    RequestDraw,
    AcceptDraw,
    DenyDraw,
    Resign,
}

impl Request {
    pub fn event(&self) -> &'static str {
        match self {
            Self::GetGameState => "get_game_state",
            Self::GetValidMoves { .. } => "get_valid_moves",
            Self::MakeMove(_) => "make_move",
            Self::RequestDraw => "request_draw",
            Self::AcceptDraw => "accept_draw",
            Self::DenyDraw => "deny_draw",
            Self::Resign => "resign",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            Self::GetValidMoves { from } => json!({ "board_index": u8::from(*from) }),
            Self::MakeMove(mv) => json!({
                "from": u8::from(mv.from),
                "to": u8::from(mv.to),
                "promote_to": mv.promote_to,
            }),
            _ => json!({}),
        }
    }
}

/// Outcome reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    White,
    Black,
    Draw,
}

impl Winner {
    /// Case-insensitive; anything else is an unknown outcome.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" => Some(Self::White),
            "black" => Some(Self::Black),
            "draw" => Some(Self::Draw),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOver {
    pub reason: Option<String>,
    pub winner: Option<Winner>,
}

impl GameOver {
    /// Read a `game_over` payload. Never fails: a missing or unrecognised
    /// field only loses that detail, the game is over either way.
    pub fn from_payload(payload: &Value) -> Self {
        let reason = ["reason", "message"]
            .iter()
            .find_map(|key| match payload.get(*key) {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            });
        let winner = payload
            .get("winner")
            .and_then(Value::as_str)
            .and_then(Winner::parse);
        Self { reason, winner }
    }
}

#[derive(Debug, Deserialize)]
struct DrawRequestedPayload {
    role: Color,
}

/// Server pushes the session reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerPush {
    GameStateUpdated(GameState),
    GameOver(GameOver),
    DrawRequested { by: Color },
}

impl ServerPush {
    /// Decode a named push. Unknown events yield `Ok(None)`.
    pub fn decode(event: &str, mut payload: Value) -> Result<Option<Self>, DecodeError> {
        let push = match event {
            GAME_STATE_UPDATED => {
                let game = take_field(&mut payload, "game")?;
                Self::GameStateUpdated(decode_embedded(game)?)
            }
            GAME_OVER => Self::GameOver(GameOver::from_payload(&payload)),
            DRAW_REQUESTED => {
                let body: DrawRequestedPayload = serde_json::from_value(payload)?;
                Self::DrawRequested { by: body.role }
            }
            _ => return Ok(None),
        };
        Ok(Some(push))
    }
}

/// Typed pushes for one topic. Ends when the transport's push stream ends.
pub struct PushStream {
    topic: String,
    rx: mpsc::UnboundedReceiver<Inbound>,
}

impl PushStream {
    pub fn new(topic: impl Into<String>, rx: mpsc::UnboundedReceiver<Inbound>) -> Self {
        Self {
            topic: topic.into(),
            rx,
        }
    }

    /// Next recognised push. Decode failures are returned so the caller can
    /// report them; other topics and unknown events are skipped.
    /// Cancel safe.
    pub async fn next(&mut self) -> Option<ClientResult<ServerPush>> {
        loop {
            let inbound = self.rx.recv().await?;
            if inbound.topic != self.topic {
                tracing::trace!(topic = %inbound.topic, "Ignoring push for other topic");
                continue;
            }
            match ServerPush::decode(&inbound.event, inbound.payload) {
                Ok(Some(push)) => return Some(Ok(push)),
                Ok(None) => {
                    tracing::trace!(event = %inbound.event, "Ignoring unknown push");
                }
                Err(e) => return Some(Err(ClientError::InvalidData(e))),
            }
        }
    }
}

/// Cheap, cloneable handle for requests on a joined room.
#[derive(Clone)]
pub struct RoomClient {
    transport: Arc<dyn Transport>,
    topic: String,
    timeout: Duration,
}

impl RoomClient {
    /// Subscribe to pushes, then join the room topic.
    ///
    /// Subscribing first means no push sent right after the join reply is lost.
    pub async fn join(
        transport: Arc<dyn Transport>,
        params: &JoinParams,
        timeout: Duration,
    ) -> ClientResult<(Self, PushStream)> {
        let topic = params.topic();
        let rx = transport.subscribe()?;

        tokio::time::timeout(timeout, transport.join(&topic, params.join_payload()))
            .await
            .map_err(|_| ClientError::Timeout("phx_join".to_string()))??;

        let client = Self {
            transport,
            topic: topic.clone(),
            timeout,
        };
        Ok((client, PushStream::new(topic, rx)))
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Send one request and await its single reply, bounded by the timeout.
    pub async fn request(&self, request: Request) -> ClientResult<Value> {
        let event = request.event();
        tracing::debug!(event, "Sending request");
        tokio::time::timeout(
            self.timeout,
            self.transport.push(&self.topic, event, request.payload()),
        )
        .await
        .map_err(|_| ClientError::Timeout(event.to_string()))?
    }

    pub async fn get_game_state(&self) -> ClientResult<GameState> {
        let reply = self.request(Request::GetGameState).await?;
        Ok(decode_embedded(reply)?)
    }

    /// Legal moves from `from`. Every returned move must start at `from`.
    pub async fn get_valid_moves(&self, from: Square) -> ClientResult<Vec<Move>> {
        let reply = self.request(Request::GetValidMoves { from }).await?;
        let moves: Vec<Move> = decode_embedded_list(reply)?;
        if let Some(stray) = moves.iter().find(|mv| mv.from != from) {
            return Err(ClientError::InvalidData(DecodeError::Json(format!(
                "move {} does not start at {}",
                stray, from
            ))));
        }
        Ok(moves)
    }

    pub async fn make_move(&self, mv: Move) -> ClientResult<()> {
        self.request(Request::MakeMove(mv)).await.map(drop)
    }

    pub async fn request_draw(&self) -> ClientResult<()> {
        self.request(Request::RequestDraw).await.map(drop)
    }

    pub async fn accept_draw(&self) -> ClientResult<()> {
        self.request(Request::AcceptDraw).await.map(drop)
    }

    pub async fn deny_draw(&self) -> ClientResult<()> {
        self.request(Request::DenyDraw).await.map(drop)
    }

    pub async fn resign(&self) -> ClientResult<()> {
        self.request(Request::Resign).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::PieceKind;

    fn sq(i: usize) -> Square {
        Square::new(i).unwrap()
    }

    #[test]
    fn join_payload_wraps_params() {
        let params = JoinParams {
            game_code: "abc123".into(),
            color: Color::Black,
            role: PlayerRole::Player,
        };
        assert_eq!(params.topic(), "room:abc123");
        assert_eq!(
            params.join_payload(),
            json!({"params": {
                "current_game_code": "abc123",
                "current_game_color": "black",
                "current_game_role": "player",
            }})
        );
    }

    #[test]
    fn make_move_payload_carries_optional_promotion() {
        let plain = Request::MakeMove(Move::new(sq(12), sq(20))).payload();
        assert_eq!(plain, json!({"from": 12, "to": 20, "promote_to": null}));

        let promo = Request::MakeMove(Move::new(sq(52), sq(60)).with_promotion(PieceKind::Knight));
        assert_eq!(promo.payload()["promote_to"], "knight");
    }

    #[test]
    fn valid_moves_payload_uses_board_index() {
        let req = Request::GetValidMoves { from: sq(9) };
        assert_eq!(req.event(), "get_valid_moves");
        assert_eq!(req.payload(), json!({"board_index": 9}));
    }

    #[test]
    fn decodes_game_state_updated_with_encoded_game() {
        let encoded = serde_json::to_string(&GameState::starting_position()).unwrap();
        let push = ServerPush::decode(GAME_STATE_UPDATED, json!({ "game": encoded }))
            .unwrap()
            .unwrap();
        assert_eq!(push, ServerPush::GameStateUpdated(GameState::starting_position()));
    }

    #[test]
    fn game_state_updated_without_game_is_an_error() {
        let result = ServerPush::decode(GAME_STATE_UPDATED, json!({}));
        assert_eq!(result, Err(DecodeError::MissingField("game")));
    }

    #[test]
    fn decodes_game_over_with_message_alias() {
        let push = ServerPush::decode(GAME_OVER, json!({"message": "Checkmate", "winner": "white"}))
            .unwrap()
            .unwrap();
        assert_eq!(
            push,
            ServerPush::GameOver(GameOver {
                reason: Some("Checkmate".into()),
                winner: Some(Winner::White),
            })
        );
    }

    #[test]
    fn game_over_decodes_whatever_the_server_sends() {
        let decode = |payload: Value| match ServerPush::decode(GAME_OVER, payload) {
            Ok(Some(ServerPush::GameOver(over))) => over,
            other => panic!("expected game over, got {:?}", other),
        };

        assert_eq!(
            decode(json!({"reason": null, "winner": "White"})),
            GameOver {
                reason: None,
                winner: Some(Winner::White),
            }
        );
        assert_eq!(decode(json!({"reason": "Checkmate", "winner": "white_player"})).winner, None);
        assert_eq!(decode(json!({})), GameOver { reason: None, winner: None });
        assert_eq!(decode(json!("over")).reason, None);
    }

    #[test]
    fn decodes_draw_requested() {
        let push = ServerPush::decode(DRAW_REQUESTED, json!({"role": "black"}))
            .unwrap()
            .unwrap();
        assert_eq!(push, ServerPush::DrawRequested { by: Color::Black });
    }

    #[test]
    fn unknown_push_is_skipped() {
        assert_eq!(ServerPush::decode("presence_diff", json!({})), Ok(None));
    }

    #[test]
    fn role_parses() {
        assert_eq!("Spectator".parse::<PlayerRole>(), Ok(PlayerRole::Spectator));
        assert!("referee".parse::<PlayerRole>().is_err());
    }

    mod round_trips {
        use super::*;
        use crate::mock::{MockCall, MockTransport};
        use tokio_test::{assert_err, assert_ok};

        fn params() -> JoinParams {
            JoinParams {
                game_code: "abc123".into(),
                color: Color::White,
                role: PlayerRole::Player,
            }
        }

        async fn joined(mock: &MockTransport) -> (RoomClient, PushStream) {
            let transport: Arc<dyn Transport> = Arc::new(mock.clone());
            assert_ok!(RoomClient::join(transport, &params(), Duration::from_secs(1)).await)
        }

        #[tokio::test]
        async fn join_rejection_is_reported() {
            let mock = MockTransport::new().with_join_response(|_| {
                Err(ClientError::JoinRejected {
                    topic: "room:abc123".into(),
                    reason: json!({"reason": "unauthorized"}),
                })
            });
            let transport: Arc<dyn Transport> = Arc::new(mock);
            let result = RoomClient::join(transport, &params(), Duration::from_secs(1)).await;
            assert!(matches!(result, Err(ClientError::JoinRejected { .. })));
        }

        #[tokio::test]
        async fn fetches_and_decodes_game_state() {
            let mock = MockTransport::new().with_standard_game();
            let (room, _pushes) = joined(&mock).await;

            let state = assert_ok!(room.get_game_state().await);
            assert_eq!(state, GameState::starting_position());
            assert_eq!(room.topic(), "room:abc123");
            assert!(matches!(
                mock.get_calls()[0],
                MockCall::Join { ref topic, .. } if topic == "room:abc123"
            ));
        }

        #[tokio::test]
        async fn moves_from_another_square_are_invalid() {
            let mock = MockTransport::new()
                .with_standard_game()
                .with_valid_moves(vec![Move::new(sq(13), sq(21))]);
            let (room, _pushes) = joined(&mock).await;

            let err = assert_err!(room.get_valid_moves(sq(12)).await);
            assert!(matches!(err, ClientError::InvalidData(_)));
        }

        #[tokio::test]
        async fn slow_reply_times_out() {
            let mock = MockTransport::new().with_standard_game();
            let _gate = mock.gate("resign");
            let transport: Arc<dyn Transport> = Arc::new(mock.clone());
            let (room, _pushes) =
                assert_ok!(RoomClient::join(transport, &params(), Duration::from_millis(20)).await);

            let err = assert_err!(room.resign().await);
            assert!(matches!(err, ClientError::Timeout(ref e) if e == "resign"));
        }

        #[tokio::test]
        async fn push_stream_skips_unknown_events_and_reports_bad_payloads() {
            let mock = MockTransport::new().with_standard_game();
            let (_room, mut pushes) = joined(&mock).await;

            mock.push_event("presence_diff", json!({}));
            mock.push_event(GAME_STATE_UPDATED, json!({"game": "{not json"}));
            mock.push_event(DRAW_REQUESTED, json!({"role": "black"}));
            mock.disconnect();

            assert!(matches!(pushes.next().await, Some(Err(ClientError::InvalidData(_)))));
            assert!(matches!(
                pushes.next().await,
                Some(Ok(ServerPush::DrawRequested { by: Color::Black }))
            ));
            assert!(pushes.next().await.is_none());
        }
    }
}
