//! Core library for studydash, a single-user personal dashboard.
//!
//! Every piece of dashboard state (header, photo, notes, routine, events)
//! follows the same pattern: render immediately from the local cache, then
//! reconcile with the remote document store in the background.
//!
//! - `cache`: synchronous local key/value store (`CacheManager`, `MemoryCache`)
//! - `remote`: async remote document store (`ApiClient`, `MemoryRemote`)
//! - `sync`: the generic `CachedField` and its codecs
//! - `features`: per-feature configurations and controllers
//! - `progress`: event countdown math
//! - `editor`: routine editor state machine
//! - `dashboard`: startup ordering and background sync fan-out

pub mod auth;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod debounce;
pub mod editor;
pub mod features;
pub mod keys;
pub mod models;
pub mod progress;
pub mod remote;
pub mod sync;
pub mod utils;

pub use auth::{Session, SessionData};
pub use cache::{CacheManager, LocalStore, LocalStoreExt, MemoryCache};
pub use config::Config;
pub use dashboard::{Dashboard, DashboardState, SyncResult};
pub use editor::{ClassForm, EditState, RoutineEditor};
pub use models::{ClassEntry, Event, EventPatch, NewEvent, Profile, Routine};
pub use progress::{progress, Progress};
pub use remote::{ApiClient, MemoryRemote, RemoteHandle, RemoteStore, StoreError};
pub use sync::{CachedField, SyncContext};
