//! Local cache keys. These are persisted on disk and must stay stable
//! across releases.

pub const PROFILE_NAME: &str = "sd_name";
pub const PROFILE_SUBTITLE: &str = "sd_subtitle";
pub const NOTES: &str = "sd_notes";
pub const NOTES_HEIGHT: &str = "sd_notes_height";
pub const PHOTO: &str = "sd_photo_b64";
pub const PHOTO_DIM: &str = "sd_photo_dim";
pub const ROUTINE: &str = "sd_routine_v1";

/// Local projection of the remote events collection. Never written remotely.
pub const EVENTS_CACHE: &str = "sd_events_cache";
