//! Session management.
//!
//! The dashboard only loads or syncs data while a session is active. A
//! `Session` is persisted to disk, expires after 30 days, and publishes
//! login/logout transitions to subscribers.

pub mod session;

pub use session::{Session, SessionData};
