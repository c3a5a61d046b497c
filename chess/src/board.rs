use serde::{Deserialize, Serialize};

use crate::square::{Square, BOARD_CELLS};
use crate::types::{Color, Piece};
use crate::wire::DecodeError;

/// The 64 cells of the board, each empty or holding exactly one piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Option<Piece>>", into = "Vec<Option<Piece>>")]
pub struct BoardSnapshot {
    cells: [Option<Piece>; BOARD_CELLS],
}

impl BoardSnapshot {
    pub fn empty() -> Self {
        Self {
            cells: [None; BOARD_CELLS],
        }
    }

    pub fn piece_on(&self, square: Square) -> Option<Piece> {
        self.cells[square.index()]
    }

    /// Returns a copy with `square` set to `piece`.
    pub fn with(mut self, square: Square, piece: Option<Piece>) -> Self {
        self.cells[square.index()] = piece;
        self
    }

    /// Whether `square` holds a piece of `color`.
    pub fn is_occupied_by(&self, square: Square, color: Color) -> bool {
        self.piece_on(square).is_some_and(|p| p.color == color)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Square, Option<Piece>)> + '_ {
        Square::all().zip(self.cells.iter().copied())
    }

    pub fn occupied(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.iter().filter_map(|(sq, p)| p.map(|p| (sq, p)))
    }
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<Vec<Option<Piece>>> for BoardSnapshot {
    type Error = DecodeError;

    fn try_from(cells: Vec<Option<Piece>>) -> Result<Self, Self::Error> {
        let len = cells.len();
        let cells: [Option<Piece>; BOARD_CELLS] = cells
            .try_into()
            .map_err(|_| DecodeError::BoardLength(len))?;
        Ok(Self { cells })
    }
}

impl From<BoardSnapshot> for Vec<Option<Piece>> {
    fn from(board: BoardSnapshot) -> Self {
        board.cells.to_vec()
    }
}

/// Last-known authoritative game state. Always replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub board: BoardSnapshot,
    pub turn: Color,
}

impl GameState {
    pub fn new(board: BoardSnapshot, turn: Color) -> Self {
        Self { board, turn }
    }

    /// The standard starting position, white to move.
    pub fn starting_position() -> Self {
        let cozy = cozy_chess::Board::default();
        let mut board = BoardSnapshot::empty();
        for square in cozy.occupied() {
            if let (Some(kind), Some(color)) = (cozy.piece_on(square), cozy.color_on(square)) {
                board = board.with(square.into(), Some(Piece::new(color.into(), kind.into())));
            }
        }
        Self::new(board, Color::White)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;
    use proptest::prelude::*;

    #[test]
    fn starting_position_has_white_pawn_on_e2() {
        let state = GameState::starting_position();
        let e2 = Square::new(12).unwrap();
        assert_eq!(
            state.board.piece_on(e2),
            Some(Piece::new(Color::White, PieceKind::Pawn))
        );
        assert_eq!(state.board.occupied().count(), 32);
        assert_eq!(state.turn, Color::White);
    }

    #[test]
    fn decodes_board_with_nulls() {
        let mut cells = vec![serde_json::Value::Null; 64];
        cells[4] = serde_json::json!({"color": "white", "piece": "king"});
        let json = serde_json::json!({"board": cells, "turn": "black", "extra": 1});

        let state: GameState = serde_json::from_value(json).unwrap();
        assert_eq!(state.turn, Color::Black);
        assert_eq!(state.board.occupied().count(), 1);
        assert!(state.board.is_occupied_by(Square::new(4).unwrap(), Color::White));
    }

    proptest! {
        #[test]
        fn board_length_must_be_exactly_64(len in 0usize..130) {
            prop_assume!(len != 64);
            let cells: Vec<Option<Piece>> = vec![None; len];
            prop_assert_eq!(
                BoardSnapshot::try_from(cells),
                Err(DecodeError::BoardLength(len))
            );
        }
    }
}
