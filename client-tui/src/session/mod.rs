//! The game session: state store, move queries, interaction machine, dialogs
//! and the controller tying them to the room transport.

mod controller;
mod dialog;
mod error;
mod machine;
mod query;
mod store;

pub use controller::GameSession;
pub use dialog::{DialogBridge, DialogConflict, DialogTicket};
pub use error::{InteractionError, SessionError};
pub use machine::{
    ConfirmKind, Effect, Input, InteractionMachine, InteractionState, QueryTicket, Selection,
};
pub use query::MoveQuery;
pub use store::GameStateStore;
