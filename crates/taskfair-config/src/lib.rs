//! Configuration for the taskfair client.
//!
//! TOML profiles, env overrides, token resolution (env + keyring +
//! session file), and translation into a ready `taskfair_api::ApiClient`.
//! The session cache itself lives in [`session`].

pub mod session;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use taskfair_api::{ApiClient, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no session token found for profile '{profile}'")]
    NoToken { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named service profiles (production, staging, ...).
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// A named service profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL (e.g., "https://api.taskfair.app/v1").
    pub api_url: String,

    /// Override request timeout in seconds.
    pub timeout: Option<u64>,

    /// Bearer token (plaintext -- prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the token.
    pub token_env: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("app", "taskfair", "taskfair").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("taskfair");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load a Config from an explicit file path (+ environment).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TASKFAIR_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the session token for a profile.
///
/// Chain: profile's `token_env` env var, then `TASKFAIR_TOKEN`, then the
/// system keyring, then the session cache file, then plaintext in the
/// profile.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(val) = std::env::var("TASKFAIR_TOKEN") {
        return Ok(SecretString::from(val));
    }

    if let Ok(entry) = keyring::Entry::new("taskfair", &format!("{profile_name}/token")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Ok(Some(session)) = session::load_session() {
        return Ok(SecretString::from(session.token));
    }

    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoToken {
        profile: profile_name.into(),
    })
}

// ── Client construction ─────────────────────────────────────────────

/// Build an [`ApiClient`] from a profile. Does NOT install a token --
/// callers resolve one separately so "no session yet" stays a warning,
/// not a hard failure.
pub fn profile_to_api_client(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ApiClient, ConfigError> {
    let url: url::Url = profile.api_url.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {}", profile.api_url),
    })?;

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    let transport = TransportConfig::default().with_timeout(timeout);

    ApiClient::new(url, &transport).map_err(|e| ConfigError::Client(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn load_config_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "staging"

[defaults]
timeout = 15

[profiles.staging]
api_url = "https://staging.taskfair.app/v1"
timeout = 5
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("staging"));
        assert_eq!(cfg.defaults.timeout, 15);
        let profile = &cfg.profiles["staging"];
        assert_eq!(profile.api_url, "https://staging.taskfair.app/v1");
        assert_eq!(profile.timeout, Some(5));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 30);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn profile_to_api_client_validates_url() {
        let profile = Profile {
            api_url: "not a url".into(),
            timeout: None,
            token: None,
            token_env: None,
        };
        let result = profile_to_api_client(&profile, &Defaults::default());
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "api_url"
        ));
    }

    #[test]
    fn plaintext_token_is_last_resort() {
        let profile = Profile {
            api_url: "https://api.taskfair.app/v1".into(),
            timeout: None,
            token: Some("plain-token".into()),
            token_env: Some("TASKFAIR_TEST_TOKEN_UNSET".into()),
        };
        let token = resolve_token(&profile, "default").unwrap();
        use secrecy::ExposeSecret;
        assert_eq!(token.expose_secret(), "plain-token");
    }
}
