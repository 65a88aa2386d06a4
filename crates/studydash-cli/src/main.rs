//! studydash - a personal dashboard in the terminal.
//!
//! Renders the header, photo status, countdown events, weekly routine and
//! notes from the local cache, then syncs them with the remote store.

mod commands;
mod render;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use studydash_core::progress::start_of_day;
use studydash_core::{ApiClient, CacheManager, Config, Dashboard, RemoteHandle, Session, SyncContext};

/// Directory for an additional log file, when set
const LOG_DIR_ENV: &str = "STUDYDASH_LOG_DIR";

/// Initialize the tracing subscriber for logging.
///
/// The returned guard must be held until exit so the file writer flushes.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "studydash.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();
    guard
}

/// Install the HTTP remote when a URL is configured. Without one the
/// dashboard runs from the local cache only.
fn remote_handle(config: &Config, session: &Session) -> Result<RemoteHandle> {
    let handle = RemoteHandle::new();
    let Some(ref url) = config.remote_url else {
        warn!("No remote_url configured, working from cache only");
        return Ok(handle);
    };
    let token = session
        .token()
        .map(String::from)
        .or_else(|| std::env::var(commands::TOKEN_ENV).ok());
    let client = ApiClient::new(url)?;
    let client = match token {
        Some(token) => client.with_token(token),
        None => client,
    };
    handle.install(Arc::new(client));
    debug!(url = %url, "Remote store installed");
    Ok(handle)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();
    info!("studydash starting");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = commands::parse(&args)?;

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    config.apply_env();

    let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
    debug!(?cache_dir, "Cache directory configured");

    let mut session = Session::new(cache_dir.clone());
    if let Err(e) = session.load() {
        warn!(error = %e, "Failed to load session");
    }

    let cache = CacheManager::new(cache_dir)?;
    let remote = remote_handle(&config, &session)?;
    let ctx = SyncContext::new(Arc::new(cache), remote);
    let mut dashboard = Dashboard::new(ctx, session);

    let today = start_of_day(&Local::now());
    commands::run(command, &mut dashboard, &mut config, today).await?;

    info!("studydash exiting");
    Ok(())
}
