use chess::{PieceKind, Square};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::session::GameSession;
use crate::ui::widgets::BoardGeometry;

/// Result of handling one terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    ToggleTheme,
    Quit,
}

/// Keyboard cursor over the board, in board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardCursor {
    file: u8,
    rank: u8,
}

impl BoardCursor {
    /// Start on e2 for white, e7 for black.
    pub fn new(flipped: bool) -> Self {
        if flipped {
            Self { file: 4, rank: 6 }
        } else {
            Self { file: 4, rank: 1 }
        }
    }

    pub fn square(&self) -> Option<Square> {
        Square::from_coords(self.file, self.rank)
    }

    /// Move by a screen direction; up is toward the far side of the board.
    pub fn step(&mut self, dx: i8, dy: i8, flipped: bool) {
        let (dx, dy) = if flipped { (-dx, -dy) } else { (dx, dy) };
        self.file = (self.file as i8 + dx).clamp(0, 7) as u8;
        self.rank = (self.rank as i8 + dy).clamp(0, 7) as u8;
    }

    pub fn jump_to(&mut self, square: Square) {
        self.file = square.file();
        self.rank = square.rank();
    }
}

/// Route a key press. Dialog keys take precedence over board keys while a
/// dialog is open.
pub fn handle_key(
    session: &mut GameSession,
    cursor: &mut BoardCursor,
    flipped: bool,
    key: KeyEvent,
) -> AppAction {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return AppAction::Quit;
    }

    if session.view().dialog().is_some() {
        handle_dialog_key(session, key.code);
        return AppAction::Continue;
    }

    match key.code {
        KeyCode::Char('Q') => return AppAction::Quit,
        KeyCode::Char('t') => return AppAction::ToggleTheme,
        KeyCode::Esc => {
            session.dismiss_notification();
        }
        KeyCode::Up | KeyCode::Char('k') => cursor.step(0, 1, flipped),
        KeyCode::Down | KeyCode::Char('j') => cursor.step(0, -1, flipped),
        KeyCode::Left | KeyCode::Char('h') => cursor.step(-1, 0, flipped),
        KeyCode::Right | KeyCode::Char('l') => cursor.step(1, 0, flipped),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(square) = cursor.square() {
                session.click(square);
            }
        }
        KeyCode::Char('r') => session.press_resign(),
        KeyCode::Char('d') => session.press_draw(),
        _ => {}
    }
    AppAction::Continue
}

fn handle_dialog_key(session: &mut GameSession, code: KeyCode) {
    use crate::view::DialogPrompt;

    let is_promotion = matches!(session.view().dialog(), Some(DialogPrompt::Promotion { .. }));
    match code {
        KeyCode::Esc => {
            session.cancel_dialog();
        }
        KeyCode::Char(c) if is_promotion => {
            if let Some(kind) = PieceKind::from_char(c).filter(|k| k.is_promotion_target()) {
                session.choose_promotion(kind);
            }
        }
        KeyCode::Char('y') | KeyCode::Enter => {
            session.answer_confirmation(true);
        }
        KeyCode::Char('n') => {
            session.answer_confirmation(false);
        }
        _ => {}
    }
}

/// Left clicks on a board square act like pressing Enter on it.
pub fn handle_mouse(
    session: &mut GameSession,
    cursor: &mut BoardCursor,
    geometry: Option<&BoardGeometry>,
    mouse: MouseEvent,
) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) || session.view().dialog().is_some() {
        return;
    }
    if let Some(square) = geometry.and_then(|g| g.square_at(mouse.column, mouse.row)) {
        cursor.jump_to(square);
        session.click(square);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_starts_on_own_pawn_rank() {
        assert_eq!(BoardCursor::new(false).square().map(|s| s.to_string()), Some("e2".into()));
        assert_eq!(BoardCursor::new(true).square().map(|s| s.to_string()), Some("e7".into()));
    }

    #[test]
    fn cursor_moves_in_screen_space() {
        let mut white = BoardCursor::new(false);
        white.step(0, 1, false);
        assert_eq!(white.square().map(|s| s.to_string()), Some("e3".into()));

        let mut black = BoardCursor::new(true);
        black.step(0, 1, true);
        assert_eq!(black.square().map(|s| s.to_string()), Some("e6".into()));
    }

    #[test]
    fn cursor_clamps_to_board_edge() {
        let mut cursor = BoardCursor::new(false);
        for _ in 0..20 {
            cursor.step(1, -1, false);
        }
        assert_eq!(cursor.square().map(|s| s.to_string()), Some("h1".into()));
    }
}
