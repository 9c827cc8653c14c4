//! Thin client-side session cache.
//!
//! A small JSON file holding who is signed in and their bearer token --
//! the only durable state the client keeps. Everything else lives
//! behind the remote API.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// The cached user session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub account_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub token: String,
    /// Whether this account has a provider profile (unlocks the
    /// dashboard, quotes, and payout screens).
    #[serde(default)]
    pub is_provider: bool,
}

/// Resolve the session file path via XDG / platform conventions.
pub fn session_path() -> PathBuf {
    ProjectDirs::from("app", "taskfair", "taskfair").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".local");
            p.push("share");
            p.push("taskfair");
            p.push("session.json");
            p
        },
        |dirs| dirs.data_dir().join("session.json"),
    )
}

/// Load the cached session, if any.
pub fn load_session() -> Result<Option<Session>, ConfigError> {
    load_session_from(&session_path())
}

/// Load a session from an explicit path.
pub fn load_session_from(path: &Path) -> Result<Option<Session>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)?;
    let session = serde_json::from_str(&raw).map_err(|e| ConfigError::Validation {
        field: "session".into(),
        reason: e.to_string(),
    })?;
    Ok(Some(session))
}

/// Persist a session to the canonical path.
pub fn save_session(session: &Session) -> Result<(), ConfigError> {
    save_session_to(&session_path(), session)
}

/// Persist a session to an explicit path.
pub fn save_session_to(path: &Path, session: &Session) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(session).map_err(|e| ConfigError::Validation {
        field: "session".into(),
        reason: e.to_string(),
    })?;
    std::fs::write(path, raw)?;
    Ok(())
}

/// Remove the cached session (sign-out).
pub fn clear_session() -> Result<(), ConfigError> {
    clear_session_at(&session_path())
}

/// Remove a session file at an explicit path.
pub fn clear_session_at(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Session {
        Session {
            account_id: "acc-42".into(),
            display_name: Some("Ada L.".into()),
            token: "tok-secret".into(),
            is_provider: true,
        }
    }

    #[test]
    fn session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        save_session_to(&path, &sample()).unwrap();
        let loaded = load_session_from(&path).unwrap().unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn missing_session_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_session_from(&dir.path().join("session.json")).unwrap(), None);
    }

    #[test]
    fn clear_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        save_session_to(&path, &sample()).unwrap();
        clear_session_at(&path).unwrap();
        assert_eq!(load_session_from(&path).unwrap(), None);

        // Clearing an absent session is fine too.
        clear_session_at(&path).unwrap();
    }

    #[test]
    fn corrupt_session_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(load_session_from(&path).is_err());
    }
}
