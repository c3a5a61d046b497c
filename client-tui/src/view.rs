//! Render model of the board page.
//!
//! `BoardView` is what the terminal widgets paint: 64 addressable cells with
//! occupant and highlight classes, a turn indicator, the loader, the modal
//! dialog and the notification. Session code only ever writes to it; the UI
//! only ever reads it.

use chess::{Color, GameState, Piece, PieceKind, Square, BOARD_CELLS};
use chess_client::{GameOver, Winner};

use crate::config::GameOverNotice;
use crate::session::Selection;

/// Highlight classes on one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellMarks {
    pub selected: bool,
    pub valid_move: bool,
    pub promotion: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellView {
    pub occupant: Option<Piece>,
    pub marks: CellMarks,
}

impl CellView {
    /// Class names in the page vocabulary (`selected`, `valid-move`,
    /// `promotion`, plus the occupant color).
    pub fn classes(&self) -> Vec<&'static str> {
        let mut classes = Vec::new();
        if let Some(piece) = self.occupant {
            classes.push(piece.color.as_str());
        }
        if self.marks.selected {
            classes.push("selected");
        }
        if self.marks.valid_move {
            classes.push("valid-move");
        }
        if self.marks.promotion {
            classes.push("promotion");
        }
        classes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogPrompt {
    Promotion { options: Vec<PieceKind> },
    Confirmation { header: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub header: String,
    pub message: String,
    pub dismissible: bool,
}

impl Notification {
    pub fn new(header: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            message: message.into(),
            dismissible: true,
        }
    }

    pub fn game_over(over: &GameOver, notice: GameOverNotice) -> Self {
        let header = match over.winner {
            Some(Winner::White) => "Game Over! White wins",
            Some(Winner::Black) => "Game Over! Black wins",
            Some(Winner::Draw) => "Game Over! Draw",
            None => "Game Over!",
        };
        Self {
            header: header.to_string(),
            message: over.reason.clone().unwrap_or_default(),
            dismissible: notice == GameOverNotice::Dismissible,
        }
    }

    /// Shown when the transport goes away. A result already announced is
    /// repeated, since the board it was shown over is blanked.
    pub fn connection_lost(result: Option<&GameOver>) -> Self {
        let unreachable = "The game server is no longer reachable. Restart to rejoin.";
        let message = match result {
            Some(over) => {
                let outcome = Self::game_over(over, GameOverNotice::Persistent);
                match over.reason.as_deref() {
                    Some(reason) if !reason.is_empty() => {
                        format!("{} ({}). {}", outcome.header, reason, unreachable)
                    }
                    _ => format!("{}. {}", outcome.header, unreachable),
                }
            }
            None => unreachable.to_string(),
        };
        Self {
            header: "Connection lost".to_string(),
            message,
            dismissible: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    cells: [CellView; BOARD_CELLS],
    turn: Option<Color>,
    loading: bool,
    dialog: Option<DialogPrompt>,
    notification: Option<Notification>,
}

impl Default for BoardView {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardView {
    /// An empty board with the loader showing.
    pub fn new() -> Self {
        Self {
            cells: [CellView::default(); BOARD_CELLS],
            turn: None,
            loading: true,
            dialog: None,
            notification: None,
        }
    }

    pub fn cell(&self, square: Square) -> &CellView {
        &self.cells[square.index()]
    }

    pub fn turn(&self) -> Option<Color> {
        self.turn
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn hide_loader(&mut self) {
        self.loading = false;
    }

    /// Set the turn indicator and every cell's occupant strictly from `game`.
    /// A cell that is empty in `game` loses any previous occupant.
    pub fn render_game(&mut self, game: &GameState) {
        self.turn = Some(game.turn);
        for (square, occupant) in game.board.iter() {
            self.cells[square.index()].occupant = occupant;
        }
    }

    /// Replace all highlight classes with exactly those implied by `selection`.
    pub fn mark_selection(&mut self, selection: Option<&Selection>) {
        for cell in self.cells.iter_mut() {
            cell.marks = CellMarks::default();
        }
        let Some(selection) = selection else {
            return;
        };
        self.cells[selection.square.index()].marks.selected = true;
        for mv in &selection.candidates {
            let marks = &mut self.cells[mv.to.index()].marks;
            marks.valid_move = true;
            marks.promotion |= mv.is_promotion();
        }
    }

    pub fn dialog(&self) -> Option<&DialogPrompt> {
        self.dialog.as_ref()
    }

    pub fn sync_dialog(&mut self, prompt: Option<&DialogPrompt>) {
        self.dialog = prompt.cloned();
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }

    /// Dismiss the notification if it allows it.
    pub fn dismiss_notification(&mut self) -> bool {
        match self.notification {
            Some(ref n) if n.dismissible => {
                self.notification = None;
                true
            }
            _ => false,
        }
    }

    /// Drop everything derived from game state.
    pub fn blank(&mut self) {
        self.cells = [CellView::default(); BOARD_CELLS];
        self.turn = None;
        self.dialog = None;
    }

    pub fn squares_marked(&self, pred: impl Fn(&CellMarks) -> bool) -> Vec<Square> {
        Square::all()
            .filter(|sq| pred(&self.cells[sq.index()].marks))
            .collect()
    }

    pub fn valid_move_squares(&self) -> Vec<Square> {
        self.squares_marked(|m| m.valid_move)
    }

    pub fn selected_square(&self) -> Option<Square> {
        self.squares_marked(|m| m.selected).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::{BoardSnapshot, Move};

    fn sq(i: usize) -> Square {
        Square::new(i).unwrap()
    }

    #[test]
    fn render_clears_cells_empty_in_new_snapshot() {
        let mut view = BoardView::new();
        view.render_game(&GameState::starting_position());
        assert!(view.cell(sq(12)).occupant.is_some());

        let lone_king = BoardSnapshot::empty().with(sq(4), Some(Piece::new(Color::White, PieceKind::King)));
        view.render_game(&GameState::new(lone_king, Color::Black));

        assert_eq!(view.turn(), Some(Color::Black));
        assert!(view.cell(sq(12)).occupant.is_none());
        assert_eq!(view.cell(sq(4)).classes(), vec!["white"]);
    }

    #[test]
    fn selection_marks_exactly_candidate_destinations() {
        let mut view = BoardView::new();
        let selection = Selection {
            square: sq(52),
            candidates: vec![
                Move::new(sq(52), sq(60)).with_promotion(PieceKind::Queen),
                Move::new(sq(52), sq(61)),
            ],
        };
        view.mark_selection(Some(&selection));

        assert_eq!(view.selected_square(), Some(sq(52)));
        assert_eq!(view.valid_move_squares(), vec![sq(60), sq(61)]);
        assert_eq!(view.cell(sq(60)).classes(), vec!["valid-move", "promotion"]);

        view.mark_selection(None);
        assert!(view.valid_move_squares().is_empty());
        assert_eq!(view.selected_square(), None);
    }

    #[test]
    fn persistent_notification_cannot_be_dismissed() {
        let mut view = BoardView::new();
        let over = GameOver {
            reason: Some("checkmate".into()),
            winner: Some(Winner::Black),
        };
        view.notify(Notification::game_over(&over, GameOverNotice::Persistent));
        assert!(!view.dismiss_notification());

        view.notify(Notification::game_over(&over, GameOverNotice::Dismissible));
        assert!(view.dismiss_notification());
        assert!(view.notification().is_none());
    }

    #[test]
    fn connection_lost_repeats_announced_result() {
        let over = GameOver {
            reason: Some("checkmate".into()),
            winner: Some(Winner::White),
        };
        let notice = Notification::connection_lost(Some(&over));
        assert_eq!(notice.header, "Connection lost");
        assert!(notice.message.starts_with("Game Over! White wins (checkmate)."));
        assert!(!notice.dismissible);

        let notice = Notification::connection_lost(None);
        assert!(notice.message.starts_with("The game server"));
    }

    #[test]
    fn blank_removes_all_game_derived_state() {
        let mut view = BoardView::new();
        view.render_game(&GameState::starting_position());
        view.blank();
        assert_eq!(view.turn(), None);
        assert!(Square::all().all(|s| view.cell(s).occupant.is_none()));
    }
}
