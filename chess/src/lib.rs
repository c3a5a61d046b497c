//! Board game domain types shared by the channel client and the terminal UI.
//!
//! The server owns the rules and the authoritative position; these types only
//! describe what it sends and validate it on the way in.

pub mod board;
pub mod moves;
pub mod square;
pub mod types;
pub mod wire;

pub use board::{BoardSnapshot, GameState};
pub use moves::Move;
pub use square::{Square, BOARD_CELLS};
pub use types::{Color, Piece, PieceKind};
pub use wire::{decode_embedded, decode_embedded_list, take_field, DecodeError};
