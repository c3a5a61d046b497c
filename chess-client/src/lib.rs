//! Game room channel client library
//!
//! Speaks the Phoenix channels protocol used by the game server: join a
//! `room:<code>` topic, push requests that each await one reply, and receive
//! server pushes. The `Transport` trait is the seam; `PhoenixSocket` is the
//! websocket implementation and `MockTransport` (feature `mock`) the test one.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use chess::Color;
//! use chess_client::{JoinParams, PhoenixSocket, PlayerRole, RoomClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let params = JoinParams {
//!         game_code: "abc123".into(),
//!         color: Color::White,
//!         role: PlayerRole::Player,
//!     };
//!     let socket = PhoenixSocket::connect("ws://localhost:4000/socket/websocket", &params.as_pairs()).await?;
//!     let (room, _pushes) = RoomClient::join(Arc::new(socket), &params, Duration::from_secs(10)).await?;
//!     let state = room.get_game_state().await?;
//!     println!("{} to move", state.turn);
//!     Ok(())
//! }
//! ```

mod error;
pub mod protocol;
mod room;
mod socket;
mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{ClientError, ClientResult};
pub use room::{
    GameOver, JoinParams, PlayerRole, PushStream, Request, RoomClient, ServerPush, Winner,
    DRAW_REQUESTED, GAME_OVER, GAME_STATE_UPDATED,
};
pub use socket::PhoenixSocket;
pub use traits::{Inbound, Transport};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCall, MockTransport, ReplyGate};
