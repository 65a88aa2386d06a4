use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Sessions are kept for 30 days before a new login is required.
const SESSION_EXPIRY_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: &str, user_id: &str) -> Self {
        Self {
            token: token.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.created_at + Duration::days(SESSION_EXPIRY_DAYS)
    }

    /// Days remaining until expiry (for display)
    pub fn days_until_expiry(&self) -> i64 {
        let expiry = self.created_at + Duration::days(SESSION_EXPIRY_DAYS);
        (expiry - Utc::now()).num_days().max(0)
    }
}

pub struct Session {
    cache_dir: PathBuf,
    data: Option<SessionData>,
    logged_in: watch::Sender<bool>,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        let (logged_in, _) = watch::channel(false);
        Self {
            cache_dir,
            data: None,
            logged_in,
        }
    }

    /// Load session from disk. Returns true when a valid session was found.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .context("Failed to read session file")?;
            let data: SessionData = serde_json::from_str(&contents)
                .context("Failed to parse session file")?;

            if !data.is_expired() {
                debug!(user_id = %data.user_id, "Restored session");
                self.set(Some(data));
                return Ok(true);
            }
            debug!("Stored session expired");
        }
        Ok(false)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents).context("Failed to write session file")?;
        }
        Ok(())
    }

    /// Log out: forget the session and delete it from disk.
    pub fn clear(&mut self) -> Result<()> {
        self.set(None);
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        info!("Logged out");
        Ok(())
    }

    /// Log in with new session data.
    pub fn update(&mut self, data: SessionData) {
        info!(user_id = %data.user_id, "Logged in");
        self.set(Some(data));
    }

    fn set(&mut self, data: Option<SessionData>) {
        self.data = data;
        let valid = self.is_logged_in();
        self.logged_in.send_if_modified(|current| {
            let changed = *current != valid;
            *current = valid;
            changed
        });
    }

    pub fn data(&self) -> Option<&SessionData> {
        self.data.as_ref()
    }

    /// Get the bearer token if a session exists
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    pub fn user_id(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.user_id.as_str())
    }

    /// Check if session is valid (exists and not expired)
    pub fn is_logged_in(&self) -> bool {
        self.data.as_ref().is_some_and(|d| !d.is_expired())
    }

    /// Receive login state changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.logged_in.subscribe()
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}
