use serde::{Deserialize, Serialize};

use crate::wire::DecodeError;

/// Number of cells on the board.
pub const BOARD_CELLS: usize = 64;

/// A board cell index in `0..64`, rank-major with index 0 = a1.
///
/// Index identity is board position, never a per-piece identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Square(u8);

impl Square {
    /// Build a square from a raw index, rejecting anything off the board.
    pub fn new(index: usize) -> Result<Self, DecodeError> {
        if index < BOARD_CELLS {
            Ok(Self(index as u8))
        } else {
            Err(DecodeError::SquareOutOfRange(index as i64))
        }
    }

    /// Build from file (0 = a) and rank (0 = first rank).
    pub fn from_coords(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self(rank * 8 + file))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn file(self) -> u8 {
        self.0 % 8
    }

    pub fn rank(self) -> u8 {
        self.0 / 8
    }

    /// Iterate all 64 squares in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_CELLS as u8).map(Square)
    }
}

impl TryFrom<i64> for Square {
    type Error = DecodeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (0..BOARD_CELLS as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(DecodeError::SquareOutOfRange(value))
        }
    }
}

impl From<Square> for u8 {
    fn from(square: Square) -> Self {
        square.0
    }
}

impl From<Square> for cozy_chess::Square {
    fn from(square: Square) -> Self {
        cozy_chess::Square::index(square.index())
    }
}

impl From<cozy_chess::Square> for Square {
    fn from(square: cozy_chess::Square) -> Self {
        Self(square as u8)
    }
}

impl std::str::FromStr for Square {
    type Err = String;

    /// Parse algebraic notation (`e2`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<cozy_chess::Square>()
            .map(Square::from)
            .map_err(|_| format!("invalid square '{}'", s))
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", cozy_chess::Square::from(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn index_twelve_is_e2() {
        let sq = Square::new(12).unwrap();
        assert_eq!(sq.to_string(), "e2");
        assert_eq!((sq.file(), sq.rank()), (4, 1));
    }

    #[test]
    fn parses_algebraic() {
        assert_eq!("a1".parse::<Square>().unwrap().index(), 0);
        assert_eq!("h8".parse::<Square>().unwrap().index(), 63);
        assert!("z9".parse::<Square>().is_err());
    }

    #[test]
    fn rejects_negative_index_from_json() {
        let result: Result<Square, _> = serde_json::from_str("-1");
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn in_range_indices_are_accepted(i in 0usize..64) {
            let sq = Square::new(i).unwrap();
            prop_assert_eq!(sq.index(), i);
            prop_assert_eq!(Square::from_coords(sq.file(), sq.rank()), Some(sq));
        }

        #[test]
        fn out_of_range_indices_are_rejected(i in 64i64..10_000) {
            prop_assert!(Square::try_from(i).is_err());
        }
    }
}
