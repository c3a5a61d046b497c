use std::io;
use std::sync::Arc;
use std::time::Duration;

use chess::Color as Side;
use chess_client::PhoenixSocket;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};

use super::input::{self, AppAction, BoardCursor};
use super::theme::Theme;
use super::widgets::{BoardGeometry, BoardWidget, DialogWidget, NotificationWidget, StatusWidget};
use crate::config::SessionConfig;
use crate::session::GameSession;

/// Connect, join the room, then hand the terminal to the board UI.
///
/// Join and initial-state failures are returned before the terminal is
/// touched, so they print normally.
pub async fn run_app(server_url: &str, config: SessionConfig) -> anyhow::Result<()> {
    let params = config.join_params();
    let socket = PhoenixSocket::connect(server_url, &params.as_pairs()).await?;
    let session = GameSession::start(config, Arc::new(socket)).await?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_ui_loop(&mut terminal, session).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_ui_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut session: GameSession,
) -> anyhow::Result<()> {
    let flipped = session.config().color == Side::Black;
    let mut cursor = BoardCursor::new(flipped);
    let mut theme = Theme::detect();
    let mut geometry: Option<BoardGeometry> = None;
    let mut session_open = true;

    let mut term_events = EventStream::new();
    // Caps the frame rate; input and pushes wake the loop immediately.
    let mut redraw_tick = tokio::time::interval(Duration::from_millis(100));

    loop {
        terminal.draw(|f| {
            geometry = Some(draw(f, &session, cursor.square(), &theme));
        })?;

        let term_event = tokio::select! {
            biased;

            maybe_event = term_events.next() => match maybe_event {
                Some(Ok(ev)) => Some(ev),
                Some(Err(e)) => {
                    tracing::warn!("Terminal event error: {}", e);
                    None
                }
                None => return Ok(()),
            },

            progressed = session.step(), if session_open => {
                if !progressed {
                    tracing::info!("Session closed");
                    session_open = false;
                }
                None
            }

            _ = redraw_tick.tick() => None,
        };

        match term_event {
            Some(Event::Key(key)) => match input::handle_key(&mut session, &mut cursor, flipped, key) {
                AppAction::Continue => {}
                AppAction::ToggleTheme => theme.toggle(),
                AppAction::Quit => {
                    tracing::info!("Quit requested");
                    return Ok(());
                }
            },
            Some(Event::Mouse(mouse)) => {
                input::handle_mouse(&mut session, &mut cursor, geometry.as_ref(), mouse)
            }
            _ => {}
        }
    }
}

/// Paint one frame and return where the board landed.
fn draw(f: &mut Frame, session: &GameSession, cursor: Option<chess::Square>, theme: &Theme) -> BoardGeometry {
    let config = session.config();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(44), Constraint::Length(32)])
        .split(f.area());
    let board_area: Rect = chunks[0];

    f.render_widget(
        BoardWidget {
            view: session.view(),
            theme,
            perspective: config.color,
            cursor,
        },
        board_area,
    );
    f.render_widget(
        StatusWidget {
            view: session.view(),
            state: session.state(),
            game_code: &config.game_code,
            player: config.color,
            role: config.role,
            theme,
        },
        chunks[1],
    );

    if let Some(notification) = session.view().notification() {
        f.render_widget(NotificationWidget { notification, theme }, board_area);
    }
    if let Some(prompt) = session.view().dialog() {
        f.render_widget(DialogWidget { prompt, theme }, board_area);
    }

    BoardGeometry::new(board_area, config.color == Side::Black)
}
