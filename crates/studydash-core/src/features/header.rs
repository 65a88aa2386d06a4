//! Header name and subtitle.

use anyhow::Result;

use crate::cache::LocalStore;
use crate::keys;
use crate::models::profile::DEFAULT_NAME;
use crate::models::Profile;
use crate::sync::{any_changed, CachedField, SyncContext, Text};

const NAME: CachedField<String, Text> = CachedField::new(keys::PROFILE_NAME, Text, String::new);
const SUBTITLE: CachedField<String, Text> =
    CachedField::new(keys::PROFILE_SUBTITLE, Text, String::new);

pub fn load_fast(cache: &dyn LocalStore) -> Profile {
    Profile::from_stored(&NAME.load_fast(cache), &SUBTITLE.load_fast(cache))
}

/// Sync both fields. Returns the profile if either one changed the cache.
pub async fn sync_from_remote(ctx: &SyncContext) -> Result<Option<Profile>> {
    let (name, subtitle) = tokio::join!(NAME.sync_from_remote(ctx), SUBTITLE.sync_from_remote(ctx));
    let changed = any_changed([name.map(|v| v.is_some()), subtitle.map(|v| v.is_some())])?;
    Ok(changed.then(|| load_fast(ctx.cache.as_ref())))
}

/// Save trimmed values. An empty name is stored as the default name; an
/// empty subtitle is stored empty and shows the default when read back.
pub async fn save(ctx: &SyncContext, name: &str, subtitle: &str) -> Result<Profile> {
    let name = match name.trim() {
        "" => DEFAULT_NAME,
        trimmed => trimmed,
    };
    NAME.save(ctx, &name.to_string()).await?;
    SUBTITLE.save(ctx, &subtitle.trim().to_string()).await?;
    Ok(load_fast(ctx.cache.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::remote::{MemoryRemote, RemoteHandle, RemoteStore};
    use serde_json::json;
    use std::sync::Arc;

    fn context() -> (SyncContext, Arc<MemoryRemote>) {
        let remote = Arc::new(MemoryRemote::new());
        let ctx = SyncContext::new(Arc::new(MemoryCache::new()), RemoteHandle::ready(remote.clone()));
        (ctx, remote)
    }

    #[test]
    fn test_empty_cache_gives_defaults() {
        let cache = MemoryCache::new();
        let profile = load_fast(&cache);
        assert_eq!(profile.name, "Name Here");
        assert_eq!(profile.subtitle, "To be doctor...");
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let (ctx, remote) = context();
        let saved = save(&ctx, "  Ada Lovelace ", " Future surgeon ").await.unwrap();
        assert_eq!(saved.name, "Ada Lovelace");
        assert_eq!(saved.subtitle, "Future surgeon");

        // Cache alone, no remote sync
        let loaded = load_fast(ctx.cache.as_ref());
        assert_eq!(loaded, saved);
        assert_eq!(remote.peek_value(keys::PROFILE_NAME), Some(json!("Ada Lovelace")));
    }

    #[tokio::test]
    async fn test_save_empty_fields_fall_back_to_defaults() {
        let (ctx, remote) = context();
        let saved = save(&ctx, "  ", "").await.unwrap();
        assert_eq!(saved, Profile::default());
        assert_eq!(remote.peek_value(keys::PROFILE_SUBTITLE), Some(json!("")));
    }

    #[tokio::test]
    async fn test_sync_reports_changes_only() {
        let (ctx, remote) = context();
        assert!(sync_from_remote(&ctx).await.unwrap().is_none());

        remote.save_value(keys::PROFILE_NAME, Some(json!("Remote Name"))).await.unwrap();
        let profile = sync_from_remote(&ctx).await.unwrap().unwrap();
        assert_eq!(profile.name, "Remote Name");
        assert_eq!(profile.subtitle, "To be doctor...");
    }

    #[tokio::test]
    async fn test_sync_keeps_name_when_subtitle_fails() {
        let (ctx, remote) = context();
        remote.save_value(keys::PROFILE_NAME, Some(json!("Remote Name"))).await.unwrap();
        remote.fail_key(keys::PROFILE_SUBTITLE);

        let profile = sync_from_remote(&ctx).await.unwrap().unwrap();
        assert_eq!(profile.name, "Remote Name");
        assert_eq!(load_fast(ctx.cache.as_ref()).name, "Remote Name");
    }

    #[tokio::test]
    async fn test_sync_error_when_nothing_changed() {
        let (ctx, remote) = context();
        remote.fail_key(keys::PROFILE_SUBTITLE);
        assert!(sync_from_remote(&ctx).await.is_err());
    }
}
