use chess::{Color as Side, Square};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use crate::ui::theme::{OverlayKind, Theme};
use crate::view::{BoardView, CellView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoardSize {
    square_width: u16,
    square_height: u16,
}

impl BoardSize {
    const SMALL: Self = Self {
        square_width: 5,
        square_height: 3,
    };

    const MEDIUM: Self = Self {
        square_width: 7,
        square_height: 3,
    };

    const LARGE: Self = Self {
        square_width: 9,
        square_height: 5,
    };

    /// Largest size whose 8x8 grid plus labels fits in `area`.
    fn for_area(area: Rect) -> Self {
        let available_width = area.width.saturating_sub(3); // rank labels
        let available_height = area.height.saturating_sub(1); // file labels

        [Self::LARGE, Self::MEDIUM]
            .into_iter()
            .find(|size| {
                size.square_width * 8 <= available_width
                    && size.square_height * 8 <= available_height
            })
            .unwrap_or(Self::SMALL)
    }
}

/// Screen placement of the 64 cells, shared by rendering and mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardGeometry {
    origin_x: u16,
    origin_y: u16,
    size: BoardSize,
    flipped: bool,
}

impl BoardGeometry {
    /// Layout for the board inside `area` (the widget's outer area).
    pub fn new(area: Rect, flipped: bool) -> Self {
        let inner = board_block().inner(area);
        let size = BoardSize::for_area(inner);

        let total_width = size.square_width * 8 + 3;
        let total_height = size.square_height * 8 + 1;
        let offset_x = inner.width.saturating_sub(total_width) / 2;
        let offset_y = inner.height.saturating_sub(total_height) / 2;

        Self {
            origin_x: inner.x + offset_x + 3,
            origin_y: inner.y + offset_y,
            size,
            flipped,
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Display column and row of `square`, row 0 at the top.
    fn display_coords(&self, square: Square) -> (u16, u16) {
        let (file, rank) = (square.file() as u16, square.rank() as u16);
        if self.flipped {
            (7 - file, rank)
        } else {
            (file, 7 - rank)
        }
    }

    /// Top-left terminal cell of `square`.
    pub fn square_origin(&self, square: Square) -> (u16, u16) {
        let (col, row) = self.display_coords(square);
        (
            self.origin_x + col * self.size.square_width,
            self.origin_y + row * self.size.square_height,
        )
    }

    /// Board square under terminal position (`column`, `row`), if any.
    pub fn square_at(&self, column: u16, row: u16) -> Option<Square> {
        let dx = column.checked_sub(self.origin_x)?;
        let dy = row.checked_sub(self.origin_y)?;
        let (col, display_row) = (dx / self.size.square_width, dy / self.size.square_height);
        if col >= 8 || display_row >= 8 {
            return None;
        }
        let (file, rank) = if self.flipped {
            (7 - col, display_row)
        } else {
            (col, 7 - display_row)
        };
        Square::from_coords(file as u8, rank as u8)
    }
}

fn board_block() -> Block<'static> {
    Block::default().title(" Board ").borders(Borders::ALL)
}

/// Paints a [`BoardView`]. Flipped when the local player is black.
pub struct BoardWidget<'a> {
    pub view: &'a BoardView,
    pub theme: &'a Theme,
    pub perspective: Side,
    pub cursor: Option<Square>,
}

impl BoardWidget<'_> {
    fn cell_background(&self, cell: &CellView, is_light_square: bool) -> ratatui::style::Color {
        let overlay = if cell.marks.selected {
            Some(OverlayKind::Selected)
        } else if cell.marks.promotion {
            Some(OverlayKind::Promotion)
        } else if cell.marks.valid_move {
            Some(OverlayKind::ValidMove)
        } else {
            None
        };
        match overlay {
            Some(kind) => self.theme.resolve_overlay(kind, is_light_square),
            None => self.theme.square(is_light_square),
        }
    }
}

impl Widget for BoardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = board_block().border_style(Style::default().fg(self.theme.board_border));
        let inner = block.inner(area);
        block.render(area, buf);

        let geometry = BoardGeometry::new(area, self.perspective == Side::Black);
        let size = geometry.size;
        let label_style = Style::default().fg(self.theme.board_label);

        for square in Square::all() {
            let (x, y) = geometry.square_origin(square);
            let cell = self.view.cell(square);
            let is_light_square = (square.file() + square.rank()) % 2 == 1;
            let bg = self.cell_background(cell, is_light_square);

            for dy in 0..size.square_height {
                for dx in 0..size.square_width {
                    let (px, py) = (x + dx, y + dy);
                    if px < inner.right() && py < inner.bottom() {
                        buf[(px, py)].set_style(Style::default().bg(bg));
                    }
                }
            }

            let (cx, cy) = (x + size.square_width / 2, y + size.square_height / 2);
            if cx >= inner.right() || cy >= inner.bottom() {
                continue;
            }
            match cell.occupant {
                Some(piece) => {
                    let fg = match piece.color {
                        Side::White => self.theme.white_piece,
                        Side::Black => self.theme.black_piece,
                    };
                    buf.set_string(
                        cx,
                        cy,
                        piece.symbol().to_string(),
                        Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD),
                    );
                }
                None if cell.marks.valid_move => {
                    buf.set_string(cx, cy, "•", Style::default().fg(self.theme.text_bright).bg(bg));
                }
                None => {}
            }

            if self.cursor == Some(square) {
                let style = Style::default().fg(self.theme.cursor).bg(bg).add_modifier(Modifier::BOLD);
                buf.set_string(x, cy, "[", style);
                if x + size.square_width - 1 < inner.right() {
                    buf.set_string(x + size.square_width - 1, cy, "]", style);
                }
            }

            let (col, row) = geometry.display_coords(square);
            if col == 0 && x >= 2 {
                buf.set_string(x - 2, cy, (square.rank() + 1).to_string(), label_style);
            }
            let label_y = y + size.square_height;
            if row == 7 && label_y < inner.bottom() {
                let file_char = (b'a' + square.file()) as char;
                buf.set_string(cx, label_y, file_char.to_string(), label_style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::GameState;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn square_at_inverts_square_origin() {
        let area = Rect::new(0, 0, 90, 50);
        for flipped in [false, true] {
            let geometry = BoardGeometry::new(area, flipped);
            for square in Square::all() {
                let (x, y) = geometry.square_origin(square);
                assert_eq!(geometry.square_at(x + 1, y + 1), Some(square));
            }
        }
    }

    #[test]
    fn white_sees_a8_top_left_black_sees_h1() {
        let area = Rect::new(0, 0, 90, 50);
        let white = BoardGeometry::new(area, false);
        let black = BoardGeometry::new(area, true);
        assert!(white.square_origin(sq("a8")) < white.square_origin(sq("b8")));
        assert_eq!(white.square_origin(sq("a8")), black.square_origin(sq("h1")));
    }

    #[test]
    fn clicks_outside_the_grid_hit_nothing() {
        let geometry = BoardGeometry::new(Rect::new(0, 0, 90, 50), false);
        assert_eq!(geometry.square_at(0, 0), None);
        assert_eq!(geometry.square_at(89, 49), None);
    }

    #[test]
    fn renders_pieces_from_view() {
        let mut view = BoardView::new();
        view.render_game(&GameState::starting_position());
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 60, 30);
        let mut buf = Buffer::empty(area);

        BoardWidget {
            view: &view,
            theme: &theme,
            perspective: Side::White,
            cursor: None,
        }
        .render(area, &mut buf);

        let glyphs: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert!(glyphs.contains('♔'));
        assert!(glyphs.contains('♚'));
        assert_eq!(glyphs.matches('♙').count(), 8);
    }
}
