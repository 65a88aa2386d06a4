//! Dashboard features.
//!
//! Each feature is a configuration of `CachedField` (header, photo, notes,
//! routine) or a controller over the remote events collection.

pub mod events;
pub mod header;
pub mod notes;
pub mod photo;
pub mod routine;

pub use events::{EventView, EventsController};
pub use notes::{NotesEditor, NotesState};
pub use photo::PhotoState;
pub use routine::RoutineController;
