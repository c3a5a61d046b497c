pub mod board;
pub mod dialog;
pub mod status;

pub use board::{BoardGeometry, BoardWidget};
pub use dialog::{DialogWidget, NotificationWidget};
pub use status::StatusWidget;
