//! Free-form notes, their editor height, and debounced saving.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::cache::LocalStore;
use crate::debounce::Debouncer;
use crate::keys;
use crate::sync::{any_changed, CachedField, Pixels, SyncContext, Text};

/// Delay between the last keystroke and the save.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

const NOTES: CachedField<String, Text> = CachedField::new(keys::NOTES, Text, String::new);
const HEIGHT: CachedField<Option<u32>, Pixels> =
    CachedField::new(keys::NOTES_HEIGHT, Pixels, || None);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesState {
    pub text: String,
    /// Editor height in pixels, when the user resized it.
    pub height: Option<u32>,
}

pub fn load_fast(cache: &dyn LocalStore) -> NotesState {
    NotesState {
        text: NOTES.load_fast(cache),
        height: HEIGHT.load_fast(cache),
    }
}

pub async fn sync_from_remote(ctx: &SyncContext) -> Result<Option<NotesState>> {
    let (text, height) = tokio::join!(NOTES.sync_from_remote(ctx), HEIGHT.sync_from_remote(ctx));
    let changed = any_changed([text.map(|v| v.is_some()), height.map(|v| v.is_some())])?;
    Ok(changed.then(|| load_fast(ctx.cache.as_ref())))
}

pub async fn save_text(ctx: &SyncContext, text: &str) -> Result<()> {
    NOTES.save(ctx, &text.to_string()).await
}

pub async fn set_height(ctx: &SyncContext, height: u32) -> Result<()> {
    HEIGHT.save(ctx, &Some(height)).await
}

/// Empty the notes locally and clear them remotely.
pub async fn clear(ctx: &SyncContext) -> Result<()> {
    NOTES.clear(ctx).await
}

/// Write the cached notes to a plain text file.
pub fn export(cache: &dyn LocalStore, path: &Path) -> Result<()> {
    let text = NOTES.load_fast(cache);
    std::fs::write(path, text)
        .with_context(|| format!("Failed to export notes to {}", path.display()))?;
    Ok(())
}

/// Replace the notes with the contents of a text file.
pub async fn import(ctx: &SyncContext, path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to import notes from {}", path.display()))?;
    save_text(ctx, &text).await?;
    Ok(text)
}

/// Notes input handler: every edit restarts the save timer, so a burst of
/// keystrokes results in a single save of the final text.
pub struct NotesEditor {
    ctx: SyncContext,
    debouncer: Debouncer,
}

impl NotesEditor {
    pub fn new(ctx: SyncContext, delay: Duration) -> Self {
        Self {
            ctx,
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn on_input(&mut self, text: &str) {
        let ctx = self.ctx.clone();
        let text = text.to_string();
        self.debouncer.schedule(async move {
            debug!(len = text.len(), "Saving notes");
            if let Err(e) = save_text(&ctx, &text).await {
                warn!(error = %e, "Failed to save notes");
            }
        });
    }

    pub fn has_pending_save(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Wait for any pending save to complete.
    pub async fn flush(&mut self) {
        self.debouncer.flush().await;
    }
}
