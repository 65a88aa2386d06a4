use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{RemoteStore, StoreError};
use crate::models::{Event, EventPatch, NewEvent};
use crate::utils::new_id;

#[derive(Debug, Default)]
struct MemoryState {
    values: HashMap<String, Value>,
    events: BTreeMap<String, Event>,
    failing_keys: HashSet<String>,
}

/// In-process remote store.
///
/// `set_failing(true)` makes every call return `StoreError::Unavailable`,
/// which is how tests simulate an unreachable backend. `fail_key` limits
/// the outage to one value, and `set_list_delay` slows down `list_events`.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    state: Mutex<MemoryState>,
    failing: AtomicBool,
    calls: AtomicUsize,
    list_delay_ms: AtomicU64,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make loads and saves of `key` fail while everything else works.
    pub fn fail_key(&self, key: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.failing_keys.insert(key.to_string());
        }
    }

    pub fn set_list_delay(&self, delay: Duration) {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.list_delay_ms.store(ms, Ordering::SeqCst);
    }

    /// Number of calls made against this store, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Insert an event as-is, bypassing `add_event`. Used to seed documents
    /// written by older clients.
    pub fn insert_event(&self, event: Event) {
        if let Ok(mut state) = self.state.lock() {
            state.events.insert(event.id.clone(), event);
        }
    }

    /// Read a stored value without counting a call.
    pub fn peek_value(&self, key: &str) -> Option<Value> {
        self.state.lock().ok()?.values.get(key).cloned()
    }

    pub fn peek_event(&self, id: &str) -> Option<Event> {
        self.state.lock().ok()?.events.get(id).cloned()
    }

    fn begin(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated outage".to_string()));
        }
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("state lock poisoned".to_string()))
    }

    fn begin_key(&self, key: &str) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        let state = self.begin()?;
        if state.failing_keys.contains(key) {
            return Err(StoreError::Unavailable(format!("simulated outage for {}", key)));
        }
        Ok(state)
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn load_value(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let state = self.begin_key(key)?;
        Ok(state.values.get(key).cloned())
    }

    async fn save_value(&self, key: &str, value: Option<Value>) -> Result<(), StoreError> {
        let mut state = self.begin_key(key)?;
        match value {
            Some(Value::Null) | None => {
                state.values.remove(key);
            }
            Some(v) => {
                state.values.insert(key.to_string(), v);
            }
        }
        Ok(())
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let delay = self.list_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        let state = self.begin()?;
        Ok(state.events.values().cloned().collect())
    }

    async fn add_event(&self, event: &NewEvent) -> Result<String, StoreError> {
        let mut state = self.begin()?;
        let id = new_id();
        state.events.insert(
            id.clone(),
            Event {
                id: id.clone(),
                name: event.name.clone(),
                date: event.date.clone(),
                created: Some(event.created.clone()),
            },
        );
        Ok(id)
    }

    async fn update_event(&self, id: &str, patch: &EventPatch) -> Result<(), StoreError> {
        let mut state = self.begin()?;
        let event = state
            .events
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("event {}", id)))?;
        patch.apply(event);
        Ok(())
    }

    async fn delete_event(&self, id: &str) -> Result<(), StoreError> {
        let mut state = self.begin()?;
        state.events.remove(id);
        Ok(())
    }

    async fn get_event(&self, id: &str) -> Result<Option<Event>, StoreError> {
        let state = self.begin()?;
        Ok(state.events.get(id).cloned())
    }
}
