use serde::{Deserialize, Serialize};

use crate::square::Square;
use crate::types::PieceKind;

/// A candidate or submitted move. Consumed once by a make-move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    #[serde(default)]
    pub promote_to: Option<PieceKind>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promote_to: None,
        }
    }

    pub fn with_promotion(mut self, kind: PieceKind) -> Self {
        self.promote_to = Some(kind);
        self
    }

    pub fn is_promotion(&self) -> bool {
        self.promote_to.is_some()
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promote_to {
            write!(f, "={}", kind.to_char_upper())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(i: usize) -> Square {
        Square::new(i).unwrap()
    }

    #[test]
    fn decodes_without_promotion_field() {
        let mv: Move = serde_json::from_str(r#"{"from":12,"to":28}"#).unwrap();
        assert_eq!(mv, Move::new(sq(12), sq(28)));
    }

    #[test]
    fn decodes_promotion() {
        let mv: Move = serde_json::from_str(r#"{"from":52,"to":60,"promote_to":"queen"}"#).unwrap();
        assert_eq!(mv.promote_to, Some(PieceKind::Queen));
        assert_eq!(mv.to_string(), "e7e8=Q");
    }

    #[test]
    fn rejects_off_board_destination() {
        let result: Result<Move, _> = serde_json::from_str(r#"{"from":12,"to":64}"#);
        assert!(result.is_err());
    }
}
