//! Plain text rendering of the dashboard.

use std::fmt::Write;

use chrono::NaiveDate;

use studydash_core::features::events::views;
use studydash_core::features::EventView;
use studydash_core::utils::{format_time_12h, truncate_string};
use studydash_core::{DashboardState, Progress, Routine};

/// Width of the countdown bar in characters
const BAR_WIDTH: usize = 20;

/// Longest notes preview shown on the dashboard
const NOTES_PREVIEW_LEN: usize = 280;

/// Countdown bar that starts full and drains toward the left as the
/// deadline approaches.
pub fn progress_bar(progress: &Progress) -> String {
    let filled = (usize::from(progress.percent) * BAR_WIDTH + 50) / 100;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn events(views: &[EventView]) -> String {
    let mut out = String::new();
    if views.is_empty() {
        out.push_str("  (no upcoming events)\n");
        return out;
    }
    for view in views {
        let _ = write!(out, "  {:<24} {:<13}", truncate_string(view.event.display_name(), 24), view.pretty_date);
        match view.progress {
            Some(ref p) => {
                let marker = if p.urgent { " !" } else { "" };
                let _ = writeln!(out, " {} {:>3} days left{}", progress_bar(p), p.days_left, marker);
            }
            None => out.push('\n'),
        }
        let _ = writeln!(out, "    id: {}", view.event.id);
    }
    out
}

pub fn routine(routine: &Routine) -> String {
    let mut out = String::new();
    for day in &routine.days {
        let _ = writeln!(out, "  {}", day);
        let entries = routine.sorted_entries(day);
        if entries.is_empty() {
            out.push_str("    -\n");
        }
        for entry in entries {
            let _ = writeln!(out, "    {}  {}  ({})", format_time_12h(&entry.time), entry.name, entry.id);
        }
    }
    out
}

/// The whole dashboard. `synced` is the age of the cached events list,
/// shown when the store records it.
pub fn dashboard(state: &DashboardState, synced: Option<&str>, today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", state.profile.name);
    let _ = writeln!(out, "{}", state.profile.subtitle);
    let photo = match (&state.photo.data, state.photo.dim) {
        (None, _) => "none".to_string(),
        (Some(data), dim) => format!("{} bytes{}", data.len(), if dim { ", dimmed" } else { "" }),
    };
    let _ = writeln!(out, "Photo: {}", photo);

    match synced {
        Some(age) => {
            let _ = writeln!(out, "\nEvents (synced {})", age);
        }
        None => out.push_str("\nEvents\n"),
    }
    out.push_str(&events(&views(&state.events, today)));

    out.push_str("\nRoutine\n");
    out.push_str(&routine(&state.routine));

    out.push_str("\nNotes\n");
    if state.notes.text.is_empty() {
        out.push_str("  (empty)\n");
    } else {
        for line in truncate_string(&state.notes.text, NOTES_PREVIEW_LEN).lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }
    out
}
