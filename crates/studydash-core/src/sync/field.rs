use anyhow::Result;
use tracing::{debug, warn};

use super::codec::Codec;
use super::SyncContext;
use crate::cache::LocalStore;
use crate::remote::StoreError;

/// One dashboard value mirrored between the local cache and the remote store.
///
/// - `load_fast` reads only the cache and never blocks on the network.
/// - `sync_from_remote` overwrites the cache when the remote has a value and
///   leaves it alone when the remote value is missing.
/// - `save` writes the cache first, then the remote. A remote failure is
///   logged and the local value stays.
pub struct CachedField<T, C> {
    key: &'static str,
    codec: C,
    default: fn() -> T,
}

impl<T, C> CachedField<T, C> {
    pub const fn new(key: &'static str, codec: C, default: fn() -> T) -> Self {
        Self { key, codec, default }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }
}

impl<T, C> CachedField<T, C>
where
    T: Send + Sync,
    C: Codec<T>,
{
    pub fn default_value(&self) -> T {
        (self.default)()
    }

    /// Read the cached value, falling back to the default when the entry is
    /// absent or cannot be decoded.
    pub fn load_fast(&self, cache: &dyn LocalStore) -> T {
        match cache.get(self.key) {
            Some(raw) => match self.codec.decode(&raw) {
                Some(value) => value,
                None => {
                    debug!(key = self.key, "Cached value unreadable, using default");
                    self.default_value()
                }
            },
            None => self.default_value(),
        }
    }

    /// Write the value to the local cache only.
    pub fn store_local(&self, cache: &dyn LocalStore, value: &T) -> Result<()> {
        match self.codec.encode(value)? {
            Some(raw) => cache.set(self.key, &raw),
            None => cache.remove(self.key),
        }
    }

    /// Fetch the remote value and, if present, make it the cached value.
    ///
    /// Returns the new value when the cache was overwritten, `None` when the
    /// remote had nothing (or something undecodable) and the cache was kept.
    pub async fn sync_from_remote(&self, ctx: &SyncContext) -> Result<Option<T>> {
        let remote = ctx.remote.get()?;
        let Some(value) = remote.load_value(self.key).await?.filter(|v| !v.is_null()) else {
            debug!(key = self.key, "Remote value missing, keeping cache");
            return Ok(None);
        };
        let Some(decoded) = self.codec.from_remote(value) else {
            warn!(key = self.key, "Remote value could not be decoded, keeping cache");
            return Ok(None);
        };
        self.store_local(ctx.cache.as_ref(), &decoded)?;
        Ok(Some(decoded))
    }

    /// Push a value to the remote store without touching the cache.
    pub async fn push_remote(&self, ctx: &SyncContext, value: &T) -> Result<()> {
        let payload = self.codec.to_remote(value)?;
        let payload = if payload.is_null() { None } else { Some(payload) };
        let remote = ctx.remote.get()?;
        remote.save_value(self.key, payload).await?;
        Ok(())
    }

    /// Write-through save. Errors are returned only for local failures; a
    /// remote failure leaves the cache updated and is logged.
    pub async fn save(&self, ctx: &SyncContext, value: &T) -> Result<()> {
        self.store_local(ctx.cache.as_ref(), value)?;
        if let Err(e) = self.push_remote(ctx, value).await {
            log_remote_failure(self.key, &e);
        }
        Ok(())
    }

    /// Remove the value locally and clear it remotely.
    pub async fn clear(&self, ctx: &SyncContext) -> Result<()> {
        ctx.cache.remove(self.key)?;
        let result = match ctx.remote.get() {
            Ok(remote) => remote.save_value(self.key, None).await.map_err(anyhow::Error::from),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            log_remote_failure(self.key, &e);
        }
        Ok(())
    }
}

fn log_remote_failure(key: &str, e: &anyhow::Error) {
    if let Some(StoreError::NotInitialized) = e.downcast_ref::<StoreError>() {
        warn!(key, "Remote store not ready, kept local value only");
    } else {
        warn!(key, error = %e, "Remote save failed, kept local value");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::remote::{MemoryRemote, RemoteHandle, RemoteStore};
    use crate::sync::codec::{Json, OptionalText, Text};
    use crate::models::Routine;
    use serde_json::json;
    use std::sync::Arc;

    const NAME: CachedField<String, Text> = CachedField::new("sd_name", Text, String::new);
    const PHOTO: CachedField<Option<String>, OptionalText> =
        CachedField::new("sd_photo_b64", OptionalText, || None);
    const ROUTINE: CachedField<Routine, Json<Routine>> =
        CachedField::new("sd_routine_v1", Json::new(), Routine::default);

    fn context() -> (SyncContext, Arc<MemoryCache>, Arc<MemoryRemote>) {
        let cache = Arc::new(MemoryCache::new());
        let remote = Arc::new(MemoryRemote::new());
        let ctx = SyncContext::new(cache.clone(), RemoteHandle::ready(remote.clone()));
        (ctx, cache, remote)
    }

    #[test]
    fn test_load_fast_defaults_without_network() {
        let (ctx, _cache, remote) = context();
        assert_eq!(ROUTINE.load_fast(ctx.cache.as_ref()), Routine::default());
        assert_eq!(NAME.load_fast(ctx.cache.as_ref()), "");
        assert_eq!(remote.call_count(), 0);
    }

    #[test]
    fn test_load_fast_malformed_json_uses_default() {
        let (ctx, cache, _remote) = context();
        cache.set("sd_routine_v1", "[[[").unwrap();
        assert_eq!(ROUTINE.load_fast(ctx.cache.as_ref()), Routine::default());
    }

    #[tokio::test]
    async fn test_save_is_write_through() {
        let (ctx, cache, remote) = context();
        NAME.save(&ctx, &"Ada".to_string()).await.unwrap();
        assert_eq!(cache.get("sd_name").as_deref(), Some("Ada"));
        assert_eq!(remote.peek_value("sd_name"), Some(json!("Ada")));
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_local_value() {
        let (ctx, cache, remote) = context();
        remote.set_failing(true);
        NAME.save(&ctx, &"Ada".to_string()).await.unwrap();
        assert_eq!(cache.get("sd_name").as_deref(), Some("Ada"));
        remote.set_failing(false);
        assert!(remote.peek_value("sd_name").is_none());
    }

    #[tokio::test]
    async fn test_uninitialized_remote_fails_fast_but_saves_locally() {
        let cache = Arc::new(MemoryCache::new());
        let ctx = SyncContext::new(cache.clone(), RemoteHandle::new());
        NAME.save(&ctx, &"Ada".to_string()).await.unwrap();
        assert_eq!(cache.get("sd_name").as_deref(), Some("Ada"));

        let err = NAME.sync_from_remote(&ctx).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::NotInitialized)));
    }

    #[tokio::test]
    async fn test_sync_overwrites_cache_when_remote_present() {
        let (ctx, cache, remote) = context();
        cache.set("sd_name", "Local").unwrap();
        remote.save_value("sd_name", Some(json!("Remote"))).await.unwrap();

        let updated = NAME.sync_from_remote(&ctx).await.unwrap();
        assert_eq!(updated.as_deref(), Some("Remote"));
        assert_eq!(cache.get("sd_name").as_deref(), Some("Remote"));
    }

    #[tokio::test]
    async fn test_sync_missing_remote_never_erases_local() {
        let (ctx, cache, _remote) = context();
        cache.set("sd_name", "Local").unwrap();
        assert!(NAME.sync_from_remote(&ctx).await.unwrap().is_none());
        assert_eq!(cache.get("sd_name").as_deref(), Some("Local"));
    }

    #[tokio::test]
    async fn test_sync_twice_is_idempotent() {
        let (ctx, cache, remote) = context();
        let mut routine = Routine::default();
        routine.ensure_day("Saturday");
        remote
            .save_value("sd_routine_v1", Some(serde_json::to_value(&routine).unwrap()))
            .await
            .unwrap();

        ROUTINE.sync_from_remote(&ctx).await.unwrap();
        let first = cache.get("sd_routine_v1");
        ROUTINE.sync_from_remote(&ctx).await.unwrap();
        assert_eq!(cache.get("sd_routine_v1"), first);
        assert_eq!(ROUTINE.load_fast(ctx.cache.as_ref()), routine);
    }

    #[tokio::test]
    async fn test_clear_removes_both_sides() {
        let (ctx, cache, remote) = context();
        PHOTO.save(&ctx, &Some("data:image/png;base64,AAA".to_string())).await.unwrap();
        assert!(remote.peek_value("sd_photo_b64").is_some());

        PHOTO.clear(&ctx).await.unwrap();
        assert!(cache.get("sd_photo_b64").is_none());
        assert!(remote.peek_value("sd_photo_b64").is_none());
        assert_eq!(PHOTO.load_fast(ctx.cache.as_ref()), None);
    }

    #[tokio::test]
    async fn test_saving_none_removes_key() {
        let (ctx, cache, remote) = context();
        PHOTO.save(&ctx, &Some("x".to_string())).await.unwrap();
        PHOTO.save(&ctx, &None).await.unwrap();
        assert!(cache.get("sd_photo_b64").is_none());
        assert!(remote.load_value("sd_photo_b64").await.unwrap().is_none());
    }
}
