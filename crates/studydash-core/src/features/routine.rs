//! Weekly class routine: persistence around the `RoutineEditor`.

use anyhow::Result;
use tracing::{debug, warn};

use crate::cache::LocalStore;
use crate::editor::{ClassForm, EditState, RoutineEditor};
use crate::keys;
use crate::models::Routine;
use crate::sync::{CachedField, Json, SyncContext};

const ROUTINE: CachedField<Routine, Json<Routine>> =
    CachedField::new(keys::ROUTINE, Json::new(), Routine::default);

/// Read the cached routine. Ids assigned while repairing an older document
/// are written back so they stay stable across loads.
pub fn load_fast(cache: &dyn LocalStore) -> Routine {
    let mut routine = ROUTINE.load_fast(cache);
    if routine.normalize() {
        debug!("Repaired cached routine");
        if let Err(e) = ROUTINE.store_local(cache, &routine) {
            warn!(error = %e, "Failed to cache repaired routine");
        }
    }
    routine
}

/// Pull the remote routine into the cache. A repaired document is saved
/// back to both stores, so every client sees the same ids.
pub async fn sync_from_remote(ctx: &SyncContext) -> Result<Option<Routine>> {
    let Some(mut routine) = ROUTINE.sync_from_remote(ctx).await? else {
        return Ok(None);
    };
    if routine.normalize() {
        debug!("Repaired remote routine");
        ROUTINE.save(ctx, &routine).await?;
    }
    Ok(Some(routine))
}

/// Owns the routine being edited and the editor state. Every mutation is
/// written through to the cache and the remote store.
pub struct RoutineController {
    ctx: SyncContext,
    routine: Routine,
    editor: RoutineEditor,
}

impl RoutineController {
    /// Controller over the cached routine, without contacting the remote.
    pub fn new(ctx: SyncContext) -> Self {
        let routine = load_fast(ctx.cache.as_ref());
        Self {
            ctx,
            routine,
            editor: RoutineEditor::new(),
        }
    }

    /// Controller over the latest remote routine. Used before a one-off
    /// mutation so a stale cache never overwrites the remote document. A
    /// failed sync falls back to the cache.
    pub async fn open_synced(ctx: SyncContext) -> Self {
        if let Err(e) = sync_from_remote(&ctx).await {
            warn!(error = %e, "Routine sync failed, editing cached copy");
        }
        Self::new(ctx)
    }

    pub fn routine(&self) -> &Routine {
        &self.routine
    }

    pub fn state(&self) -> &EditState {
        self.editor.state()
    }

    /// Reload from cache and reset the editor, as when the dialog opens.
    pub fn open(&mut self) -> &Routine {
        self.routine = load_fast(self.ctx.cache.as_ref());
        self.editor.open();
        &self.routine
    }

    async fn persist(&self) -> Result<()> {
        ROUTINE.save(&self.ctx, &self.routine).await
    }

    pub async fn add(&mut self, form: &ClassForm) -> Result<Option<String>> {
        let id = self.editor.add(&mut self.routine, form);
        if id.is_some() {
            self.persist().await?;
        }
        Ok(id)
    }

    pub fn begin_edit(&mut self, day: &str, id: &str) -> Option<ClassForm> {
        self.editor.begin_edit(&self.routine, day, id)
    }

    pub async fn update(&mut self, form: &ClassForm) -> Result<bool> {
        let changed = self.editor.update(&mut self.routine, form);
        if changed {
            self.persist().await?;
        }
        Ok(changed)
    }

    pub fn cancel(&mut self) {
        self.editor.cancel();
    }

    pub async fn delete(&mut self, day: &str, id: &str) -> Result<bool> {
        let removed = self.editor.delete(&mut self.routine, day, id);
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    pub async fn set_days(&mut self, days: &[String]) -> Result<()> {
        self.routine.set_days(days);
        self.persist().await
    }

    /// Reset to the default routine.
    pub async fn clear(&mut self) -> Result<()> {
        self.routine = Routine::default();
        self.editor.cancel();
        self.persist().await
    }
}
