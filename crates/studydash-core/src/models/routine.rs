use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::utils::new_id;

/// Week order used when offering days to pick from.
pub const WEEK_ORDER: [&str; 7] = [
    "Saturday",
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
];

/// Days selected in a fresh routine.
pub const DEFAULT_DAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// One class in the weekly routine. `time` is a 24-hour "HH:MM" string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub time: String,
}

/// The weekly class routine.
///
/// Every key in `items` is also listed in `days`. Both live in one JSON
/// document, so they are always written together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub items: BTreeMap<String, Vec<ClassEntry>>,
}

impl Default for Routine {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS.iter().map(|d| d.to_string()).collect(),
            items: BTreeMap::new(),
        }
    }
}

impl Routine {
    /// Repair documents written by older clients: assign missing ids and
    /// list any day that has entries but is missing from `days`. Returns
    /// true when anything was changed.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        for entries in self.items.values_mut() {
            for entry in entries.iter_mut().filter(|e| e.id.is_empty()) {
                entry.id = new_id();
                changed = true;
            }
        }
        let missing: Vec<String> = self
            .items
            .keys()
            .filter(|day| !self.days.contains(day))
            .cloned()
            .collect();
        changed |= !missing.is_empty();
        self.days.extend(missing);
        changed
    }

    pub fn ensure_day(&mut self, day: &str) {
        if !self.days.iter().any(|d| d == day) {
            self.days.push(day.to_string());
        }
    }

    /// Append an entry to `day`, listing the day if needed.
    pub fn push_entry(&mut self, day: &str, entry: ClassEntry) {
        self.items.entry(day.to_string()).or_default().push(entry);
        self.ensure_day(day);
    }

    pub fn find(&self, day: &str, id: &str) -> Option<&ClassEntry> {
        self.items.get(day)?.iter().find(|e| e.id == id)
    }

    pub fn remove_entry(&mut self, day: &str, id: &str) -> Option<ClassEntry> {
        let entries = self.items.get_mut(day)?;
        let idx = entries.iter().position(|e| e.id == id)?;
        Some(entries.remove(idx))
    }

    /// Entries for `day` ordered by time. Times compare as strings, so
    /// malformed values sort wherever they happen to land.
    pub fn sorted_entries(&self, day: &str) -> Vec<&ClassEntry> {
        let mut entries: Vec<&ClassEntry> = self
            .items
            .get(day)
            .map(|list| list.iter().collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| a.time.cmp(&b.time));
        entries
    }

    /// Replace the selected days. Duplicates are dropped and entries for
    /// deselected days are discarded.
    pub fn set_days(&mut self, days: &[String]) {
        let mut selected: Vec<String> = Vec::new();
        for day in days {
            let day = day.trim();
            if !day.is_empty() && !selected.iter().any(|d| d == day) {
                selected.push(day.to_string());
            }
        }
        self.items.retain(|day, _| selected.contains(day));
        self.days = selected;
    }

    /// True when every day referenced in `items` is listed in `days`.
    pub fn is_consistent(&self) -> bool {
        self.items.keys().all(|day| self.days.contains(day))
    }

    pub fn entry_count(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }
}
