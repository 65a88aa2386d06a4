//! Dashboard startup and background sync.
//!
//! Startup renders everything from the local cache first, then fans out one
//! remote sync per feature in a background task. Results come back over an
//! mpsc channel and are applied by `check_background_tasks`.

use chrono::NaiveDate;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::auth::Session;
use crate::features::{events, header, notes, photo, routine, NotesState, PhotoState};
use crate::models::{Event, Profile, Routine};
use crate::sync::SyncContext;

/// Capacity of the sync result channel
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Results sent from the background sync task.
#[derive(Debug)]
pub enum SyncResult {
    Profile(Profile),
    Photo(PhotoState),
    Notes(NotesState),
    Routine(Routine),
    Events(Vec<Event>),
    /// A feature failed to sync; its cached value stays in place and the
    /// failure is only logged
    Error(String),
    /// Every feature has reported
    Complete,
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub profile: Profile,
    pub photo: PhotoState,
    pub notes: NotesState,
    pub routine: Routine,
    pub events: Vec<Event>,
}

pub struct Dashboard {
    ctx: SyncContext,
    session: Session,
    pub state: DashboardState,
    sync_rx: mpsc::Receiver<SyncResult>,
    sync_tx: mpsc::Sender<SyncResult>,
    syncing: bool,
    sync_errors: usize,
    pub status_message: Option<String>,
}

impl Dashboard {
    pub fn new(ctx: SyncContext, session: Session) -> Self {
        let (sync_tx, sync_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            ctx,
            session,
            state: DashboardState::default(),
            sync_rx,
            sync_tx,
            syncing: false,
            sync_errors: 0,
            status_message: None,
        }
    }

    pub fn context(&self) -> &SyncContext {
        &self.ctx
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing
    }

    /// Features that failed during the last background sync.
    pub fn sync_errors(&self) -> usize {
        self.sync_errors
    }

    /// Render from cache, then start the background sync.
    ///
    /// Does nothing without an active session. Returns whether a sync was
    /// started.
    pub fn init_app(&mut self, today: NaiveDate) -> bool {
        if !self.load_fast() {
            return false;
        }
        self.sync_all_background(today)
    }

    /// Populate the state from the local cache only. Returns false (and
    /// leaves the state untouched) when no one is logged in.
    pub fn load_fast(&mut self) -> bool {
        if !self.session.is_logged_in() {
            warn!("Not logged in, skipping dashboard load");
            return false;
        }
        let cache = self.ctx.cache.as_ref();
        self.state = DashboardState {
            profile: header::load_fast(cache),
            photo: photo::load_fast(cache),
            notes: notes::load_fast(cache),
            routine: routine::load_fast(cache),
            events: events::load_fast(cache),
        };
        debug!(events = self.state.events.len(), "Loaded dashboard from cache");
        true
    }

    /// Spawn a background task that syncs every feature concurrently.
    pub fn sync_all_background(&mut self, today: NaiveDate) -> bool {
        if !self.ctx.remote.is_ready() {
            warn!("Remote store not configured, working from cache only");
            return false;
        }
        info!("Starting background sync");
        let tx = self.sync_tx.clone();
        let ctx = self.ctx.clone();
        tokio::spawn(async move {
            Self::execute_background_sync(tx, ctx, today).await;
        });
        self.syncing = true;
        self.sync_errors = 0;
        self.status_message = Some("Syncing...".to_string());
        true
    }

    /// Helper to send sync results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<SyncResult>, result: SyncResult) {
        if let Err(e) = tx.send(result).await {
            warn!(error = %e, "Failed to send sync result - channel closed");
        }
    }

    /// Helper to send a changed value, or nothing when the remote had no value.
    async fn send_sync_result<T, F>(
        tx: &mpsc::Sender<SyncResult>,
        name: &str,
        result: anyhow::Result<Option<T>>,
        wrapper: F,
    ) where
        F: FnOnce(T) -> SyncResult,
    {
        match result {
            Ok(Some(data)) => {
                debug!("{} synced", name);
                Self::send_result(tx, wrapper(data)).await;
            }
            Ok(None) => debug!("{} unchanged", name),
            Err(e) => {
                warn!(error = %e, "{} sync failed", name);
                Self::send_result(tx, SyncResult::Error(format!("{}: {}", name, e))).await;
            }
        }
    }

    /// Each feature reports as soon as its own sync finishes, so a slow one
    /// never holds back the others.
    async fn execute_background_sync(tx: mpsc::Sender<SyncResult>, ctx: SyncContext, today: NaiveDate) {
        let (tx, ctx) = (&tx, &ctx);
        tokio::join!(
            async {
                let result = header::sync_from_remote(ctx).await;
                Self::send_sync_result(tx, "Profile", result, SyncResult::Profile).await;
            },
            async {
                let result = photo::sync_from_remote(ctx).await;
                Self::send_sync_result(tx, "Photo", result, SyncResult::Photo).await;
            },
            async {
                let result = notes::sync_from_remote(ctx).await;
                Self::send_sync_result(tx, "Notes", result, SyncResult::Notes).await;
            },
            async {
                let result = routine::sync_from_remote(ctx).await;
                Self::send_sync_result(tx, "Routine", result, SyncResult::Routine).await;
            },
            async {
                let result = events::sync_from_remote(ctx, today).await.map(Some);
                Self::send_sync_result(tx, "Events", result, SyncResult::Events).await;
            },
        );

        info!("Background sync complete");
        Self::send_result(&tx, SyncResult::Complete).await;
    }

    /// Apply any results that have arrived, without waiting.
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.sync_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_sync_result(result);
        }
    }

    /// Apply results until the running sync reports completion.
    pub async fn wait_for_sync(&mut self) {
        while self.syncing {
            match self.sync_rx.recv().await {
                Some(result) => self.process_sync_result(result),
                None => break,
            }
        }
    }

    fn process_sync_result(&mut self, result: SyncResult) {
        match result {
            SyncResult::Profile(profile) => self.state.profile = profile,
            SyncResult::Photo(photo) => self.state.photo = photo,
            SyncResult::Notes(notes) => self.state.notes = notes,
            SyncResult::Routine(routine) => self.state.routine = routine,
            SyncResult::Events(events) => self.state.events = events,
            SyncResult::Error(message) => {
                debug!(%message, "Keeping cached state after sync failure");
                self.sync_errors += 1;
            }
            SyncResult::Complete => {
                self.syncing = false;
                if self
                    .status_message
                    .as_deref()
                    .is_some_and(|m| m.starts_with("Syncing"))
                {
                    self.status_message = None;
                }
            }
        }
    }
}
