//! Data models for dashboard entities.
//!
//! - `Profile`: header name and subtitle
//! - `Event`, `NewEvent`, `EventPatch`: countdown events and their remote payloads
//! - `Routine`, `ClassEntry`: the weekly class routine

pub mod event;
pub mod profile;
pub mod routine;

pub use event::{Event, EventPatch, NewEvent};
pub use profile::Profile;
pub use routine::{ClassEntry, Routine, DEFAULT_DAYS, WEEK_ORDER};
