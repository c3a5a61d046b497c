use chess::Color;
use chess_client::PlayerRole;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The stored identity of the game to join, as the launcher page leaves it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredSession {
    pub current_game_code: String,
    pub current_game_color: Color,
    #[serde(default)]
    pub current_game_role: PlayerRole,
}

/// Get the path to the stored session file.
pub fn session_file_path() -> PathBuf {
    session_file_path_in(&crate::config::get_home_dir())
}

fn session_file_path_in(dir: &Path) -> PathBuf {
    dir.join("session.json")
}

/// Remember the session so the next launch rejoins it.
pub fn save_session(session: &StoredSession) -> Result<PathBuf, String> {
    save_session_to(session, &crate::config::get_home_dir())
}

fn save_session_to(session: &StoredSession, dir: &Path) -> Result<PathBuf, String> {
    std::fs::create_dir_all(dir).map_err(|e| format!("Failed to create directory: {}", e))?;

    let path = session_file_path_in(dir);
    let json = serde_json::to_string_pretty(session)
        .map_err(|e| format!("Failed to serialize session: {}", e))?;

    std::fs::write(&path, json).map_err(|e| format!("Failed to write session file: {}", e))?;

    Ok(path)
}

/// Load the stored session, if one exists.
pub fn load_session() -> Result<Option<StoredSession>, String> {
    load_session_from(&crate::config::get_home_dir())
}

fn load_session_from(dir: &Path) -> Result<Option<StoredSession>, String> {
    let path = session_file_path_in(dir);
    if !path.exists() {
        return Ok(None);
    }

    let contents =
        std::fs::read_to_string(&path).map_err(|e| format!("Failed to read session file: {}", e))?;

    let session: StoredSession = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse session file: {}", e))?;

    Ok(Some(session))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> StoredSession {
        StoredSession {
            current_game_code: "k3xq9".to_string(),
            current_game_color: Color::Black,
            current_game_role: PlayerRole::Player,
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let session = sample_session();

        let path = save_session_to(&session, dir.path()).unwrap();
        assert!(path.ends_with("session.json"));

        let loaded = load_session_from(dir.path()).unwrap();
        assert_eq!(loaded, Some(session));
    }

    #[test]
    fn test_load_nonexistent_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_session_from(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_role_defaults_to_player() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            session_file_path_in(dir.path()),
            r#"{"current_game_code": "abc", "current_game_color": "white"}"#,
        )
        .unwrap();

        let loaded = load_session_from(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.current_game_role, PlayerRole::Player);
        assert_eq!(loaded.current_game_color, Color::White);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(session_file_path_in(dir.path()), "{not json").unwrap();
        let err = load_session_from(dir.path()).unwrap_err();
        assert!(err.starts_with("Failed to parse session file"));
    }
}
