use chess::Color as Side;
use chess_client::PlayerRole;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::session::InteractionState;
use crate::ui::format::capitalize;
use crate::ui::theme::Theme;
use crate::view::BoardView;

/// Side panel: game code, whose turn it is, local state and key help.
pub struct StatusWidget<'a> {
    pub view: &'a BoardView,
    pub state: &'a InteractionState,
    pub game_code: &'a str,
    pub player: Side,
    pub role: PlayerRole,
    pub theme: &'a Theme,
}

impl StatusWidget<'_> {
    fn turn_line(&self) -> Line<'static> {
        if self.view.is_loading() {
            return Line::styled("Loading...", Style::default().fg(self.theme.muted));
        }
        match self.view.turn() {
            Some(turn) if turn == self.player && self.role == PlayerRole::Player => Line::styled(
                format!("{} to move (you)", capitalize(turn.as_str())),
                Style::default()
                    .fg(self.theme.positive)
                    .add_modifier(Modifier::BOLD),
            ),
            Some(turn) => Line::styled(
                format!("{} to move", capitalize(turn.as_str())),
                Style::default().fg(self.theme.text_primary),
            ),
            None => Line::styled("No game", Style::default().fg(self.theme.negative)),
        }
    }
}

impl Widget for StatusWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let label = Style::default().fg(self.theme.muted);
        let value = Style::default().fg(self.theme.text_bright);
        let role = match self.role {
            PlayerRole::Player => self.player.as_str(),
            PlayerRole::Spectator => "spectator",
        };

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Game:  ", label),
                Span::styled(self.game_code.to_string(), value),
            ]),
            Line::from(vec![
                Span::styled("You:   ", label),
                Span::styled(role.to_string(), value),
            ]),
            Line::from(vec![
                Span::styled("State: ", label),
                Span::styled(self.state.name().replace('_', " "), value),
            ]),
            Line::raw(""),
            self.turn_line(),
            Line::raw(""),
        ];

        let help: &[&str] = match self.role {
            PlayerRole::Player => &[
                "arrows/hjkl  move cursor",
                "enter/space  select",
                "mouse        click a square",
                "r            resign",
                "d            offer draw",
                "t            toggle theme",
                "Q/ctrl-c     quit",
            ],
            PlayerRole::Spectator => &["t            toggle theme", "Q/ctrl-c     quit"],
        };
        lines.extend(help.iter().map(|h| Line::styled(*h, label)));

        let block = Block::default()
            .title(" Status ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.panel_border));
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::GameState;

    #[test]
    fn shows_turn_for_local_player() {
        let mut view = BoardView::new();
        view.render_game(&GameState::starting_position());
        view.hide_loader();

        let theme = Theme::dark();
        let area = Rect::new(0, 0, 40, 20);
        let mut buf = Buffer::empty(area);
        StatusWidget {
            view: &view,
            state: &InteractionState::Idle,
            game_code: "abc123",
            player: Side::White,
            role: PlayerRole::Player,
            theme: &theme,
        }
        .render(area, &mut buf);

        let text: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("White to move (you)"));
        assert!(text.contains("abc123"));
    }
}
