use chess::Color;
use chess_client::PlayerRole;
use clap::Parser;
use client_tui::config::{self, Overrides};
use client_tui::session_file::{self, StoredSession};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Join a live game room from the terminal.
///
/// The game to join is read from the stored session file; flags override it.
#[derive(Parser)]
#[command(name = "client-tui", about = "Terminal client for live two-player chess")]
struct Cli {
    /// Websocket endpoint of the game server.
    #[arg(long)]
    server: Option<String>,

    /// Game code of the room to join.
    #[arg(long)]
    game: Option<String>,

    /// Color you play (white or black).
    #[arg(long)]
    color: Option<Color>,

    /// Join as player or spectator.
    #[arg(long)]
    role: Option<PlayerRole>,

    /// Keep the game-over notice on screen until exit.
    #[arg(long)]
    persistent_game_over: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing with file output; the terminal belongs to the UI.
    let log_dir = config::get_log_dir();
    std::fs::create_dir_all(&log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&log_dir, "easychess-client-tui");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Client starting up");

    tracing::debug!(path = %session_file::session_file_path().display(), "Reading stored session");
    let stored = session_file::load_session().unwrap_or_else(|e| {
        tracing::warn!("Ignoring stored session: {}", e);
        None
    });
    let remember = cli.game.is_some();
    let session_config = config::resolve_session(
        Overrides {
            game_code: cli.game,
            color: cli.color,
            role: cli.role,
            persistent_game_over: cli.persistent_game_over,
        },
        stored,
    )?;

    if remember {
        let stored = StoredSession {
            current_game_code: session_config.game_code.clone(),
            current_game_color: session_config.color,
            current_game_role: session_config.role,
        };
        if let Err(e) = session_file::save_session(&stored) {
            tracing::warn!("Failed to store session: {}", e);
        }
    }

    let server_url = cli.server.unwrap_or_else(config::get_server_url);
    println!(
        "Joining game {} as {} at {}",
        session_config.game_code, session_config.color, server_url
    );
    println!("Debug logs: {}/easychess-client-tui.YYYY-MM-DD", log_dir.display());

    client_tui::ui::run_app(&server_url, session_config).await?;

    tracing::info!("Client shutting down");
    Ok(())
}
