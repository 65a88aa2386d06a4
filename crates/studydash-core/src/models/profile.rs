use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "Name Here";
pub const DEFAULT_SUBTITLE: &str = "To be doctor...";

/// Header text shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub subtitle: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
        }
    }
}

impl Profile {
    /// Build a profile from stored fields, substituting defaults for
    /// fields that are empty after trimming.
    pub fn from_stored(name: &str, subtitle: &str) -> Self {
        let name = name.trim();
        let subtitle = subtitle.trim();
        Self {
            name: if name.is_empty() { DEFAULT_NAME } else { name }.to_string(),
            subtitle: if subtitle.is_empty() { DEFAULT_SUBTITLE } else { subtitle }.to_string(),
        }
    }
}
