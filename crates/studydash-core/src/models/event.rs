use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::progress::{progress, Progress};
use crate::utils::format_date_pretty;

/// Date format used for event `date` and `created` fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A countdown event as stored in the remote events collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
    /// Older documents may lack this; it is backfilled on first read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// Payload for creating an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub date: String,
    pub created: String,
}

/// Partial update of an event. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl EventPatch {
    pub fn rename(name: &str, date: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            date: Some(date.to_string()),
            created: None,
        }
    }

    pub fn backfill_created(created: &str) -> Self {
        Self {
            created: Some(created.to_string()),
            ..Default::default()
        }
    }

    pub fn apply(&self, event: &mut Event) {
        if let Some(ref name) = self.name {
            event.name = name.clone();
        }
        if let Some(ref date) = self.date {
            event.date = date.clone();
        }
        if let Some(ref created) = self.created {
            event.created = Some(created.clone());
        }
    }
}

pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()
}

pub fn date_string(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl Event {
    pub fn target_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    pub fn created_date(&self) -> Option<NaiveDate> {
        self.created.as_deref().and_then(parse_date)
    }

    /// Countdown relative to `today`. A missing `created` counts as today.
    pub fn progress(&self, today: NaiveDate) -> Option<Progress> {
        let target = self.target_date()?;
        let created = self.created_date().unwrap_or(today);
        Some(progress(created, target, today))
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "(no title)"
        } else {
            &self.name
        }
    }

    pub fn formatted_date(&self) -> String {
        format_date_pretty(&self.date)
    }
}

/// Sort events by date ascending (string order, so missing dates come first).
pub fn sort_by_date(events: &mut [Event]) {
    events.sort_by(|a, b| a.date.cmp(&b.date));
}
