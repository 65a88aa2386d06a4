//! Cache-then-remote synchronization.
//!
//! Each dashboard value is a `CachedField`: a cache key plus a `Codec` that
//! knows how to turn the value into a cache string and a remote JSON value.
//! Features are configurations of this one component.

pub mod codec;
pub mod field;

use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::cache::LocalStore;
use crate::remote::RemoteHandle;

pub use codec::{Codec, Flag, Json, OptionalText, Pixels, Text};
pub use field::CachedField;

/// The two stores every feature reads and writes.
#[derive(Clone)]
pub struct SyncContext {
    pub cache: Arc<dyn LocalStore>,
    pub remote: RemoteHandle,
}

impl SyncContext {
    pub fn new(cache: Arc<dyn LocalStore>, remote: RemoteHandle) -> Self {
        Self { cache, remote }
    }
}

/// Fold the per-field results of one feature sync. A field that changed the
/// cache is reported even when a sibling field failed, so its update is not
/// lost. The first error is returned only when nothing changed.
pub fn any_changed(results: impl IntoIterator<Item = Result<bool>>) -> Result<bool> {
    let mut changed = false;
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(c) => changed |= c,
            Err(e) => errors.push(e),
        }
    }
    if changed {
        for e in &errors {
            warn!(error = %e, "Field sync failed, keeping cached value");
        }
        return Ok(true);
    }
    match errors.into_iter().next() {
        Some(e) => Err(e),
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_changed_keeps_partial_success() {
        assert!(any_changed([Ok(true), Err(anyhow::anyhow!("down"))]).unwrap());
        assert!(any_changed([Err(anyhow::anyhow!("down")), Ok(true)]).unwrap());
        assert!(!any_changed([Ok(false), Ok(false)]).unwrap());
        let err = any_changed([Ok(false), Err(anyhow::anyhow!("down"))]).unwrap_err();
        assert_eq!(err.to_string(), "down");
    }
}
