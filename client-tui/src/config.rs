//! Runtime configuration for the board client.
//!
//! Every tunable has a compile-time default and can be overridden at runtime
//! via a dedicated environment variable. Command-line flags, handled in
//! `main`, take precedence over both.

use std::path::PathBuf;
use std::time::Duration;

use chess::Color;
use chess_client::{JoinParams, PlayerRole};

use crate::session::SessionError;
use crate::session_file::StoredSession;

/// Default websocket endpoint of the game server.
const DEFAULT_SERVER_URL: &str = "ws://localhost:4000/socket/websocket";

/// Default bound on every request/reply round trip (in seconds).
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default directory for the daily rolling log files.
const DEFAULT_LOG_DIR: &str = "logs";

/// Directory name under the home directory holding `session.json`.
const DEFAULT_HOME_DIR_NAME: &str = ".easychess";

/// Get the websocket endpoint of the game server.
///
/// Priority:
/// 1. `EASYCHESS_SERVER_URL` env variable if set
/// 2. `ws://localhost:4000/socket/websocket` as fallback
pub fn get_server_url() -> String {
    std::env::var("EASYCHESS_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string())
}

/// Get the request timeout in seconds.
///
/// Priority:
/// 1. `EASYCHESS_REQUEST_TIMEOUT_SECS` env variable if set (falls back to the
///    default if the value cannot be parsed as a `u64`)
/// 2. `10` seconds as fallback
pub fn get_request_timeout_secs() -> u64 {
    if let Ok(timeout) = std::env::var("EASYCHESS_REQUEST_TIMEOUT_SECS") {
        return timeout.parse().unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    DEFAULT_REQUEST_TIMEOUT_SECS
}

pub fn get_request_timeout() -> Duration {
    Duration::from_secs(get_request_timeout_secs())
}

/// Get the directory the client writes its logs to.
///
/// Priority:
/// 1. `EASYCHESS_LOG_DIR` env variable if set
/// 2. `logs` (relative to the working directory) as fallback
pub fn get_log_dir() -> PathBuf {
    if let Ok(path) = std::env::var("EASYCHESS_LOG_DIR") {
        return PathBuf::from(path);
    }

    PathBuf::from(DEFAULT_LOG_DIR)
}

/// Get the directory holding the stored session file.
///
/// Priority:
/// 1. `EASYCHESS_HOME` env variable if set
/// 2. `~/.easychess` as fallback
pub fn get_home_dir() -> PathBuf {
    if let Ok(path) = std::env::var("EASYCHESS_HOME") {
        return PathBuf::from(path);
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_HOME_DIR_NAME)
}

/// How the game-over notification behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameOverNotice {
    #[default]
    Dismissible,
    /// Stays on screen until the client exits.
    Persistent,
}

/// Everything a session needs to join and run one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub game_code: String,
    pub color: Color,
    pub role: PlayerRole,
    pub request_timeout: Duration,
    pub game_over_notice: GameOverNotice,
}

impl SessionConfig {
    pub fn new(game_code: impl Into<String>, color: Color, role: PlayerRole) -> Self {
        Self {
            game_code: game_code.into(),
            color,
            role,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            game_over_notice: GameOverNotice::default(),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_game_over_notice(mut self, notice: GameOverNotice) -> Self {
        self.game_over_notice = notice;
        self
    }

    pub fn join_params(&self) -> JoinParams {
        JoinParams {
            game_code: self.game_code.clone(),
            color: self.color,
            role: self.role,
        }
    }
}

/// Values given on the command line. Each one wins over the stored session.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub game_code: Option<String>,
    pub color: Option<Color>,
    pub role: Option<PlayerRole>,
    pub persistent_game_over: bool,
}

/// Merge command-line overrides over the stored session.
pub fn resolve_session(
    overrides: Overrides,
    stored: Option<StoredSession>,
) -> Result<SessionConfig, SessionError> {
    let game_code = overrides
        .game_code
        .or_else(|| stored.as_ref().map(|s| s.current_game_code.clone()))
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| SessionError::Config("no game code given or stored".to_string()))?;
    let color = overrides
        .color
        .or_else(|| stored.as_ref().map(|s| s.current_game_color))
        .ok_or_else(|| SessionError::Config("no player color given or stored".to_string()))?;
    let role = overrides
        .role
        .or_else(|| stored.as_ref().map(|s| s.current_game_role))
        .unwrap_or_default();

    let notice = if overrides.persistent_game_over {
        GameOverNotice::Persistent
    } else {
        GameOverNotice::Dismissible
    };

    Ok(SessionConfig::new(game_code, color, role)
        .with_request_timeout(get_request_timeout())
        .with_game_over_notice(notice))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_server_url() {
        let url = get_server_url();
        match std::env::var("EASYCHESS_SERVER_URL") {
            Ok(val) => assert_eq!(url, val),
            Err(_) => assert_eq!(url, DEFAULT_SERVER_URL),
        }
    }

    #[test]
    fn test_get_request_timeout_secs_default() {
        if std::env::var("EASYCHESS_REQUEST_TIMEOUT_SECS").is_err() {
            assert_eq!(get_request_timeout_secs(), DEFAULT_REQUEST_TIMEOUT_SECS);
        }
    }

    #[test]
    fn test_get_log_dir() {
        let dir = get_log_dir();
        match std::env::var("EASYCHESS_LOG_DIR") {
            Ok(val) => assert_eq!(dir, PathBuf::from(val)),
            Err(_) => assert_eq!(dir, PathBuf::from(DEFAULT_LOG_DIR)),
        }
    }

    #[test]
    fn test_get_home_dir_ends_with_default_name() {
        if std::env::var("EASYCHESS_HOME").is_err() {
            assert!(get_home_dir().ends_with(DEFAULT_HOME_DIR_NAME));
        }
    }

    #[test]
    fn session_config_builds_join_params() {
        let config = SessionConfig::new("abc123", Color::Black, PlayerRole::Player)
            .with_game_over_notice(GameOverNotice::Persistent);
        let params = config.join_params();
        assert_eq!(params.topic(), "room:abc123");
        assert_eq!(params.color, Color::Black);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    fn stored() -> StoredSession {
        StoredSession {
            current_game_code: "stored1".to_string(),
            current_game_color: Color::White,
            current_game_role: PlayerRole::Spectator,
        }
    }

    #[test]
    fn overrides_win_over_stored_values() {
        let overrides = Overrides {
            game_code: Some("cli42".to_string()),
            color: Some(Color::Black),
            ..Default::default()
        };
        let config = resolve_session(overrides, Some(stored())).unwrap();
        assert_eq!(config.game_code, "cli42");
        assert_eq!(config.color, Color::Black);
        assert_eq!(config.role, PlayerRole::Spectator);
        assert_eq!(config.game_over_notice, GameOverNotice::Dismissible);
    }

    #[test]
    fn missing_game_code_is_a_config_error() {
        let overrides = Overrides {
            color: Some(Color::White),
            persistent_game_over: true,
            ..Default::default()
        };
        assert!(matches!(
            resolve_session(overrides, None),
            Err(SessionError::Config(_))
        ));
    }

    #[test]
    fn stored_session_alone_is_enough() {
        let config = resolve_session(Overrides::default(), Some(stored())).unwrap();
        assert_eq!(config.join_params().topic(), "room:stored1");
    }
}
