use std::sync::{Arc, OnceLock};

use super::{RemoteStore, StoreError};

/// Shared slot for the remote store.
///
/// The store becomes available once its backend is ready. Until then every
/// access fails with `StoreError::NotInitialized` instead of proceeding.
#[derive(Clone, Default)]
pub struct RemoteHandle {
    slot: Arc<OnceLock<Arc<dyn RemoteStore>>>,
}

impl RemoteHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that is ready immediately.
    pub fn ready(store: Arc<dyn RemoteStore>) -> Self {
        let handle = Self::new();
        handle.install(store);
        handle
    }

    /// Install the store. Returns false if one was already installed.
    pub fn install(&self, store: Arc<dyn RemoteStore>) -> bool {
        self.slot.set(store).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn get(&self) -> Result<Arc<dyn RemoteStore>, StoreError> {
        self.slot.get().cloned().ok_or(StoreError::NotInitialized)
    }
}
