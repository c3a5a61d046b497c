//! Terminal client for a live two-player board game hosted on a remote
//! server.
//!
//! [`session::GameSession`] joins a game room over a
//! [`chess_client::Transport`], keeps the server's latest [`chess::GameState`]
//! and drives the local interaction state machine. [`view::BoardView`] is the
//! render model the [`ui`] paints.

pub mod config;
pub mod session;
pub mod session_file;
pub mod ui;
pub mod view;

pub use config::{GameOverNotice, SessionConfig};
pub use session::{GameSession, InteractionError, InteractionState, SessionError};
pub use view::{BoardView, DialogPrompt, Notification};
