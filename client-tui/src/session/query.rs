use chess::{Move, Square};
use chess_client::RoomClient;

use super::error::InteractionError;

/// "Valid moves from square X" as a single request/reply round trip.
#[derive(Clone)]
pub struct MoveQuery {
    room: RoomClient,
}

impl MoveQuery {
    pub fn new(room: RoomClient) -> Self {
        Self { room }
    }

    /// An empty list means the square has no legal moves, which is not an error.
    pub async fn valid_moves(&self, from: Square) -> Result<Vec<Move>, InteractionError> {
        match self.room.get_valid_moves(from).await {
            Ok(moves) => {
                tracing::debug!(square = %from, count = moves.len(), "Valid moves loaded");
                Ok(moves)
            }
            Err(source) => {
                tracing::warn!(square = %from, "Valid moves query failed: {}", source);
                Err(InteractionError::QueryFailed {
                    square: from,
                    source,
                })
            }
        }
    }
}
