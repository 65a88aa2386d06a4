//! Remote document store module.
//!
//! The remote store holds the authoritative copy of every dashboard value:
//! a key/value area for arbitrary JSON and a separate events collection.
//!
//! - `RemoteStore`: the async contract
//! - `ApiClient`: HTTP adapter for a JSON document service
//! - `MemoryRemote`: in-process store with failure injection
//! - `RemoteHandle`: fails fast until a store has been installed

pub mod client;
pub mod error;
pub mod handle;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{Event, EventPatch, NewEvent};

pub use client::ApiClient;
pub use error::StoreError;
pub use handle::RemoteHandle;
pub use memory::MemoryRemote;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Load a value. `None` means nothing was ever stored (or it was cleared).
    async fn load_value(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Store a value. `None` clears it.
    async fn save_value(&self, key: &str, value: Option<Value>) -> Result<(), StoreError>;

    async fn list_events(&self) -> Result<Vec<Event>, StoreError>;

    /// Create an event and return its remote-assigned id.
    async fn add_event(&self, event: &NewEvent) -> Result<String, StoreError>;

    async fn update_event(&self, id: &str, patch: &EventPatch) -> Result<(), StoreError>;

    async fn delete_event(&self, id: &str) -> Result<(), StoreError>;

    async fn get_event(&self, id: &str) -> Result<Option<Event>, StoreError>;
}
