use chess::PieceKind;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::ui::format::capitalize;
use crate::ui::theme::Theme;
use crate::view::{DialogPrompt, Notification};

/// Rect of `width` x `height` centered in `area`, clamped to it.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn promotion_key(kind: PieceKind) -> char {
    kind.to_char_lower()
}

/// Modal promotion choice or yes/no confirmation.
pub struct DialogWidget<'a> {
    pub prompt: &'a DialogPrompt,
    pub theme: &'a Theme,
}

impl Widget for DialogWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, lines) = match self.prompt {
            DialogPrompt::Promotion { options } => {
                let mut lines = vec![Line::raw("")];
                for kind in options {
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("  {:<8}", capitalize(kind.as_str())),
                            Style::default().fg(self.theme.text_primary),
                        ),
                        Span::styled(
                            format!("({})", promotion_key(*kind)),
                            Style::default().fg(self.theme.dialog_highlight),
                        ),
                    ]));
                }
                lines.push(Line::raw(""));
                lines.push(Line::styled(
                    "Press q/r/b/n to select | Esc to cancel",
                    Style::default().fg(self.theme.muted),
                ));
                (" Promote to ".to_string(), lines)
            }
            DialogPrompt::Confirmation { header, message } => {
                let lines = vec![
                    Line::raw(""),
                    Line::styled(message.clone(), Style::default().fg(self.theme.text_primary)),
                    Line::raw(""),
                    Line::styled(
                        "y: yes | n: no | Esc: cancel",
                        Style::default().fg(self.theme.muted),
                    ),
                ];
                (format!(" {} ", header), lines)
            }
        };

        let dialog_area = centered(area, 44, lines.len() as u16 + 2);
        Clear.render(dialog_area, buf);
        let block = Block::default()
            .title(Span::styled(
                title,
                Style::default()
                    .fg(self.theme.dialog_highlight)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.dialog_border))
            .style(Style::default().bg(self.theme.dialog_bg));

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(dialog_area, buf);
    }
}

/// Header/message box with an optional dismiss hint.
pub struct NotificationWidget<'a> {
    pub notification: &'a Notification,
    pub theme: &'a Theme,
}

impl Widget for NotificationWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![
            Line::raw(""),
            Line::styled(
                self.notification.message.clone(),
                Style::default().fg(self.theme.text_primary),
            ),
        ];
        if self.notification.dismissible {
            lines.push(Line::raw(""));
            lines.push(Line::styled(
                "Esc to dismiss",
                Style::default().fg(self.theme.muted),
            ));
        }

        let notice_area = centered(area, 50, lines.len() as u16 + 3);
        Clear.render(notice_area, buf);
        let block = Block::default()
            .title(format!(" {} ", self.notification.header))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.notification_border))
            .style(Style::default().bg(self.theme.dialog_bg));

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(notice_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(widget: impl Widget, area: Rect) -> String {
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn promotion_dialog_lists_options() {
        let prompt = DialogPrompt::Promotion {
            options: PieceKind::PROMOTIONS.to_vec(),
        };
        let text = rendered(
            DialogWidget {
                prompt: &prompt,
                theme: &Theme::dark(),
            },
            Rect::new(0, 0, 60, 20),
        );
        assert!(text.contains("Queen"));
        assert!(text.contains("(n)"));
    }

    #[test]
    fn persistent_notification_has_no_dismiss_hint() {
        let mut notification = Notification::new("Game Over!", "checkmate");
        notification.dismissible = false;
        let text = rendered(
            NotificationWidget {
                notification: &notification,
                theme: &Theme::dark(),
            },
            Rect::new(0, 0, 60, 20),
        );
        assert!(text.contains("checkmate"));
        assert!(!text.contains("dismiss"));
    }
}
