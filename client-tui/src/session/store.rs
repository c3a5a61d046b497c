use chess::GameState;

use crate::view::BoardView;

/// Holds the last-known authoritative snapshot. No history, no merging.
#[derive(Debug)]
pub struct GameStateStore {
    current: GameState,
    revision: u64,
}

impl GameStateStore {
    /// Store the initial fetch and render it.
    pub fn new(initial: GameState, view: &mut BoardView) -> Self {
        view.render_game(&initial);
        Self {
            current: initial,
            revision: 0,
        }
    }

    /// Overwrite the snapshot unconditionally and re-render every cell.
    pub fn replace(&mut self, next: GameState, view: &mut BoardView) {
        self.current = next;
        self.revision += 1;
        tracing::debug!(revision = self.revision, turn = %self.current.turn, "Game state replaced");
        view.render_game(&self.current);
    }

    pub fn current(&self) -> &GameState {
        &self.current
    }

    /// Number of replacements since the initial fetch.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
