//! `taskfair` — terminal client for the taskfair services marketplace.
//!
//! Screens are navigable via number keys (1-5): Browse, Bookings,
//! Quotes, Payouts, and Dashboard. All durable state lives behind the
//! remote API; the client only keeps a thin session cache on disk.
//!
//! Logs are written to a file (default `/tmp/taskfair.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks,
//! config/session resolution, and app launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use taskfair_api::ApiClient;
use taskfair_config::session::Session;
use taskfair_config::{Config, Profile, profile_to_api_client, resolve_token};
use taskfair_core::QueryCache;

use crate::action::Notification;
use crate::app::App;

const DEFAULT_API_URL: &str = "https://api.taskfair.app/v1";

/// Terminal client for browsing providers, managing bookings, quotes,
/// and payouts on the taskfair marketplace.
#[derive(Parser, Debug)]
#[command(name = "taskfair", version, about)]
struct Cli {
    /// API base URL (overrides the configured profile)
    #[arg(short = 'u', long, env = "TASKFAIR_API_URL")]
    api_url: Option<String>,

    /// Config profile name (defaults to the configured default)
    #[arg(short = 'p', long, env = "TASKFAIR_PROFILE")]
    profile: Option<String>,

    /// Log file path
    #[arg(long, default_value = "/tmp/taskfair.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that
/// would corrupt the TUI output. Returns a guard that must be held for
/// the lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "taskfair={log_level},taskfair_core={log_level},taskfair_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("taskfair.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Pick the profile to use: CLI URL override wins, then the named (or
/// default) profile from config, then the built-in production URL.
fn select_profile(cli: &Cli, config: &Config) -> (String, Profile) {
    if let Some(url) = &cli.api_url {
        return (
            "cli".into(),
            Profile {
                api_url: url.clone(),
                timeout: None,
                token: None,
                token_env: None,
            },
        );
    }

    let name = cli
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into());

    if let Some(profile) = config.profiles.get(&name) {
        return (
            name.clone(),
            Profile {
                api_url: profile.api_url.clone(),
                timeout: profile.timeout,
                token: profile.token.clone(),
                token_env: profile.token_env.clone(),
            },
        );
    }

    (
        name,
        Profile {
            api_url: DEFAULT_API_URL.into(),
            timeout: None,
            token: None,
            token_env: None,
        },
    )
}

/// Resolve the ambient session: install a token on the client if one
/// can be found, and return the cached session for the status line.
fn resolve_session(client: &ApiClient, profile: &Profile, profile_name: &str) -> Option<Session> {
    match resolve_token(profile, profile_name) {
        Ok(token) => client.set_token(Some(token)),
        Err(e) => warn!(error = %e, "no session token resolved"),
    }
    taskfair_config::session::load_session().ok().flatten()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file — hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let config = taskfair_config::load_config_or_default();
    let (profile_name, profile) = select_profile(&cli, &config);

    info!(
        profile = %profile_name,
        api_url = %profile.api_url,
        "starting taskfair"
    );

    let client = profile_to_api_client(&profile, &config.defaults)
        .map_err(|e| eyre!("cannot build API client: {e}"))?;
    let session = resolve_session(&client, &profile, &profile_name);
    let cache = QueryCache::new(client.clone());

    let mut app = App::new(client.clone(), cache, session)?;
    if !client.has_token() {
        app.notify_on_start(Notification::warning(
            "No session found — set TASKFAIR_TOKEN or sign in from another device",
        ));
    }
    app.run().await?;

    Ok(())
}
