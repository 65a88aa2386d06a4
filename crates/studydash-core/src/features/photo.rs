//! Background photo and its dim preference.

use anyhow::Result;

use crate::cache::LocalStore;
use crate::keys;
use crate::sync::{any_changed, CachedField, Flag, OptionalText, SyncContext};

const PHOTO: CachedField<Option<String>, OptionalText> =
    CachedField::new(keys::PHOTO, OptionalText, || None);
const DIM: CachedField<bool, Flag> = CachedField::new(keys::PHOTO_DIM, Flag, || true);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoState {
    /// Opaque encoded image (typically a data URL).
    pub data: Option<String>,
    pub dim: bool,
}

impl Default for PhotoState {
    fn default() -> Self {
        Self {
            data: None,
            dim: true,
        }
    }
}

pub fn load_fast(cache: &dyn LocalStore) -> PhotoState {
    PhotoState {
        data: PHOTO.load_fast(cache),
        dim: DIM.load_fast(cache),
    }
}

pub async fn sync_from_remote(ctx: &SyncContext) -> Result<Option<PhotoState>> {
    let (photo, dim) = tokio::join!(PHOTO.sync_from_remote(ctx), DIM.sync_from_remote(ctx));
    let changed = any_changed([photo.map(|v| v.is_some()), dim.map(|v| v.is_some())])?;
    Ok(changed.then(|| load_fast(ctx.cache.as_ref())))
}

pub async fn set_photo(ctx: &SyncContext, data: &str) -> Result<PhotoState> {
    PHOTO.save(ctx, &Some(data.to_string())).await?;
    Ok(load_fast(ctx.cache.as_ref()))
}

pub async fn remove_photo(ctx: &SyncContext) -> Result<PhotoState> {
    PHOTO.clear(ctx).await?;
    Ok(load_fast(ctx.cache.as_ref()))
}

pub async fn set_dim(ctx: &SyncContext, dim: bool) -> Result<PhotoState> {
    DIM.save(ctx, &dim).await?;
    Ok(load_fast(ctx.cache.as_ref()))
}
