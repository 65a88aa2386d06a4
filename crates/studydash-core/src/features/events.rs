//! Countdown events. The remote collection is authoritative; the cached list
//! is a projection used for the instant render.

use anyhow::Result;
use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{debug, info};

use crate::cache::LocalStore;
use crate::keys;
use crate::models::event::{date_string, parse_date, sort_by_date};
use crate::models::{Event, EventPatch, NewEvent};
use crate::progress::Progress;
use crate::sync::{CachedField, Json, SyncContext};

const EVENTS: CachedField<Vec<Event>, Json<Vec<Event>>> =
    CachedField::new(keys::EVENTS_CACHE, Json::new(), Vec::new);

/// An event ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventView {
    pub event: Event,
    /// `None` when the event date cannot be parsed.
    pub progress: Option<Progress>,
    pub pretty_date: String,
}

pub fn load_fast(cache: &dyn LocalStore) -> Vec<Event> {
    EVENTS.load_fast(cache)
}

/// List events from the remote, backfill missing `created` dates, sort, and
/// replace the cached list.
pub async fn sync_from_remote(ctx: &SyncContext, today: NaiveDate) -> Result<Vec<Event>> {
    let remote = ctx.remote.get()?;
    let mut events = remote.list_events().await?;

    let created = date_string(today);
    let patch = EventPatch::backfill_created(&created);
    let missing: Vec<String> = events
        .iter_mut()
        .filter(|e| e.created.is_none())
        .map(|e| {
            e.created = Some(created.clone());
            e.id.clone()
        })
        .collect();
    if !missing.is_empty() {
        debug!(count = missing.len(), "Backfilling event created dates");
        let writes = missing.iter().map(|id| remote.update_event(id, &patch));
        for (id, result) in missing.iter().zip(join_all(writes).await) {
            if let Err(e) = result {
                debug!(id = %id, error = %e, "Failed to backfill created date");
            }
        }
    }

    sort_by_date(&mut events);
    EVENTS.store_local(ctx.cache.as_ref(), &events)?;
    Ok(events)
}

pub fn views(events: &[Event], today: NaiveDate) -> Vec<EventView> {
    events
        .iter()
        .map(|event| EventView {
            event: event.clone(),
            progress: event.progress(today),
            pretty_date: event.formatted_date(),
        })
        .collect()
}

/// Add/edit/delete over the remote events collection. Holds the id of the
/// event being edited, if any.
pub struct EventsController {
    ctx: SyncContext,
    events: Vec<Event>,
    editing_id: Option<String>,
}

impl EventsController {
    pub fn new(ctx: SyncContext) -> Self {
        let events = load_fast(ctx.cache.as_ref());
        Self {
            ctx,
            events,
            editing_id: None,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub async fn refresh(&mut self, today: NaiveDate) -> Result<&[Event]> {
        self.events = sync_from_remote(&self.ctx, today).await?;
        Ok(&self.events)
    }

    /// Add a new event, or apply the form to the event being edited.
    ///
    /// Returns false without touching anything when name or date is empty.
    /// The date must be `yyyy-mm-dd`.
    pub async fn submit(&mut self, name: &str, date: &str, today: NaiveDate) -> Result<bool> {
        let name = name.trim();
        let date = date.trim();
        if name.is_empty() || date.is_empty() {
            return Ok(false);
        }
        if parse_date(date).is_none() {
            anyhow::bail!("Invalid date '{}', expected YYYY-MM-DD", date);
        }

        let remote = self.ctx.remote.get()?;
        match self.editing_id.take() {
            Some(id) => {
                remote.update_event(&id, &EventPatch::rename(name, date)).await?;
                info!(id = %id, "Event updated");
            }
            None => {
                let event = NewEvent {
                    name: name.to_string(),
                    date: date.to_string(),
                    created: date_string(today),
                };
                let id = remote.add_event(&event).await?;
                info!(id = %id, "Event added");
            }
        }
        self.refresh(today).await?;
        Ok(true)
    }

    /// Fetch an event and enter edit mode. Returns `(name, date)` to prefill
    /// the form, or `None` when the event no longer exists.
    pub async fn begin_edit(&mut self, id: &str) -> Result<Option<(String, String)>> {
        let remote = self.ctx.remote.get()?;
        let Some(event) = remote.get_event(id).await? else {
            return Ok(None);
        };
        self.editing_id = Some(id.to_string());
        Ok(Some((event.name, event.date)))
    }

    pub fn cancel_edit(&mut self) {
        self.editing_id = None;
    }

    pub async fn delete(&mut self, id: &str, today: NaiveDate) -> Result<()> {
        let remote = self.ctx.remote.get()?;
        remote.delete_event(id).await?;
        if self.editing_id.as_deref() == Some(id) {
            self.editing_id = None;
        }
        self.refresh(today).await?;
        Ok(())
    }

    pub fn views(&self, today: NaiveDate) -> Vec<EventView> {
        views(&self.events, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::remote::{MemoryRemote, RemoteHandle, StoreError};
    use std::sync::Arc;

    fn context() -> (SyncContext, Arc<MemoryRemote>) {
        let remote = Arc::new(MemoryRemote::new());
        let ctx = SyncContext::new(Arc::new(MemoryCache::new()), RemoteHandle::ready(remote.clone()));
        (ctx, remote)
    }

    fn day(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn event(id: &str, name: &str, date: &str, created: Option<&str>) -> Event {
        Event {
            id: id.to_string(),
            name: name.to_string(),
            date: date.to_string(),
            created: created.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_sync_backfills_created_and_sorts() {
        let (ctx, remote) = context();
        remote.insert_event(event("b", "Finals", "2024-03-01", None));
        remote.insert_event(event("a", "Midterm", "2024-01-11", Some("2024-01-01")));

        let events = sync_from_remote(&ctx, day("2024-01-06")).await.unwrap();
        assert_eq!(events[0].id, "a");
        assert_eq!(events[1].created.as_deref(), Some("2024-01-06"));
        assert_eq!(remote.peek_event("b").unwrap().created.as_deref(), Some("2024-01-06"));
        assert_eq!(load_fast(ctx.cache.as_ref()), events);
    }

    #[tokio::test]
    async fn test_submit_adds_with_created_today() {
        let (ctx, remote) = context();
        let mut controller = EventsController::new(ctx.clone());
        assert!(controller
            .submit("Midterm", "2024-01-11", day("2024-01-01"))
            .await
            .unwrap());

        let views = controller.views(day("2024-01-06"));
        assert_eq!(views.len(), 1);
        let stored = remote.peek_event(&views[0].event.id).unwrap();
        assert_eq!(stored.created.as_deref(), Some("2024-01-01"));
        let progress = views[0].progress.unwrap();
        assert_eq!(progress.days_left, 5);
        assert_eq!(progress.percent, 50);
        assert!(progress.urgent);
        assert_eq!(views[0].pretty_date, "Jan 11, 2024");
    }

    #[tokio::test]
    async fn test_edit_keeps_created() {
        let (ctx, remote) = context();
        remote.insert_event(event("e1", "Quiz", "2024-02-01", Some("2024-01-01")));
        let mut controller = EventsController::new(ctx);

        let prefill = controller.begin_edit("e1").await.unwrap().unwrap();
        assert_eq!(prefill, ("Quiz".to_string(), "2024-02-01".to_string()));
        assert_eq!(controller.editing_id(), Some("e1"));

        controller
            .submit("Quiz 2", "2024-02-10", day("2024-01-20"))
            .await
            .unwrap();
        assert_eq!(controller.editing_id(), None);
        let stored = remote.peek_event("e1").unwrap();
        assert_eq!(stored.name, "Quiz 2");
        assert_eq!(stored.date, "2024-02-10");
        assert_eq!(stored.created.as_deref(), Some("2024-01-01"));
    }

    #[tokio::test]
    async fn test_empty_submit_is_noop() {
        let (ctx, remote) = context();
        let mut controller = EventsController::new(ctx);
        assert!(!controller.submit("  ", "2024-01-01", day("2024-01-01")).await.unwrap());
        assert!(!controller.submit("Exam", "", day("2024-01-01")).await.unwrap());
        assert_eq!(remote.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_date_rejected() {
        let (ctx, remote) = context();
        let mut controller = EventsController::new(ctx);
        assert!(controller.submit("Exam", "next week", day("2024-01-01")).await.is_err());
        assert_eq!(remote.call_count(), 0);
    }

    #[tokio::test]
    async fn test_begin_edit_missing_event() {
        let (ctx, _remote) = context();
        let mut controller = EventsController::new(ctx);
        assert!(controller.begin_edit("gone").await.unwrap().is_none());
        assert_eq!(controller.editing_id(), None);
    }

    #[tokio::test]
    async fn test_delete_edited_event_cancels_edit() {
        let (ctx, remote) = context();
        remote.insert_event(event("e1", "Quiz", "2024-02-01", Some("2024-01-01")));
        remote.insert_event(event("e2", "Lab", "2024-02-05", Some("2024-01-01")));
        let mut controller = EventsController::new(ctx);

        controller.begin_edit("e1").await.unwrap();
        controller.delete("e2", day("2024-01-10")).await.unwrap();
        assert_eq!(controller.editing_id(), Some("e1"));

        controller.delete("e1", day("2024-01-10")).await.unwrap();
        assert_eq!(controller.editing_id(), None);
        assert!(controller.events().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_cached_list() {
        let (ctx, remote) = context();
        remote.insert_event(event("e1", "Quiz", "2024-02-01", Some("2024-01-01")));
        sync_from_remote(&ctx, day("2024-01-10")).await.unwrap();

        remote.set_failing(true);
        let err = sync_from_remote(&ctx, day("2024-01-11")).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::Unavailable(_))));
        assert_eq!(load_fast(ctx.cache.as_ref()).len(), 1);
    }

    #[test]
    fn test_unparseable_date_has_no_progress() {
        let events = vec![event("x", "", "someday", None)];
        let views = views(&events, day("2024-01-01"));
        assert!(views[0].progress.is_none());
        assert_eq!(views[0].event.display_name(), "(no title)");
        assert_eq!(views[0].pretty_date, "someday");
    }
}
