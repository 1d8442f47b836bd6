//! Event mapping service: keeps the mapping store fresh and resolves events
//! against it.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use common::{
    LogSink, MappedScores, PersistedSportEvent, Result, SportEvent, TracingSink,
};
use mapping_store::{PeriodicTask, TemporalMappingStore, MIN_PERIOD};
use tracing::Level;

use crate::payload::parse_mapping_payload;
use crate::source::MappingSource;
use crate::transform;

#[derive(Debug, Default)]
struct PollState {
    poller: Option<PeriodicTask>,
    stopped: bool,
}

/// Owns the poll loop that refreshes a [`TemporalMappingStore`] and exposes
/// the read-only event transform over the store's current contents.
///
/// At most one poll timer exists at a time: `start_polling` while already
/// polling is a no-op. `stop_polling` is terminal; it also destroys the
/// store's sweeper, and the service cannot be restarted afterwards.
pub struct EventMappingService {
    store: Arc<TemporalMappingStore>,
    source: Arc<dyn MappingSource>,
    log: Arc<dyn LogSink>,
    state: Mutex<PollState>,
}

impl EventMappingService {
    pub fn new(store: Arc<TemporalMappingStore>, source: Arc<dyn MappingSource>) -> Self {
        Self {
            store,
            source,
            log: Arc::new(TracingSink),
            state: Mutex::new(PollState::default()),
        }
    }

    /// Replace the default `tracing` sink.
    pub fn with_log_sink(mut self, log: Arc<dyn LogSink>) -> Self {
        self.log = log;
        self
    }

    pub fn store(&self) -> &Arc<TemporalMappingStore> {
        &self.store
    }

    /// Refresh mappings now and then every `interval`.
    ///
    /// Returns false without starting anything if a poll timer is already
    /// running or the service has been stopped. An `interval` below
    /// [`MIN_PERIOD`] is clamped to it.
    pub fn start_polling(&self, interval: Duration) -> bool {
        let interval = interval.max(MIN_PERIOD);
        let mut state = self.state();
        if state.stopped {
            self.log.log(
                Level::WARN,
                "Polling for event mappings already stopped; not restarting",
            );
            return false;
        }
        if state.poller.is_some() {
            self.log
                .log(Level::DEBUG, "Polling for event mappings already active");
            return false;
        }

        self.log.log(
            Level::INFO,
            &format!(
                "Starting polling for event mappings. Interval {}ms",
                interval.as_millis()
            ),
        );

        let source = self.source.clone();
        let store = self.store.clone();
        let log = self.log.clone();
        state.poller = Some(PeriodicTask::spawn_now(interval, move || {
            let source = source.clone();
            let store = store.clone();
            let log = log.clone();
            async move {
                refresh_mappings(source.as_ref(), &store, log.as_ref()).await;
            }
        }));
        true
    }

    pub fn is_polling(&self) -> bool {
        self.state().poller.is_some()
    }

    /// Fetch and apply one mapping payload. Returns how many pairs were written.
    ///
    /// Fetch errors and empty payloads are logged and leave the store as-is.
    pub async fn update_mappings(&self) -> usize {
        refresh_mappings(self.source.as_ref(), &self.store, self.log.as_ref()).await
    }

    /// Cancel the poll timer and the store's sweeper. Idempotent.
    ///
    /// A refresh already in flight is allowed to finish but is never
    /// rescheduled.
    pub fn stop_polling(&self) {
        let mut state = self.state();
        if state.stopped {
            return;
        }
        state.stopped = true;
        if let Some(poller) = state.poller.take() {
            poller.cancel();
        }
        drop(state);

        self.log.log(Level::INFO, "Polling for event mappings stopped");
        self.store.destroy();
    }

    pub fn get_mapped_scores(&self, raw: &str) -> Result<MappedScores> {
        transform::get_mapped_scores(&self.store, raw)
    }

    pub fn transform_event(&self, persisted: &PersistedSportEvent) -> Result<SportEvent> {
        transform::transform_event(&self.store, persisted)
    }

    pub fn verify_event_mappings(&self, persisted: &PersistedSportEvent) -> Result<()> {
        transform::verify_event_mappings(&self.store, persisted)
    }

    fn state(&self) -> MutexGuard<'_, PollState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

async fn refresh_mappings(
    source: &dyn MappingSource,
    store: &TemporalMappingStore,
    log: &dyn LogSink,
) -> usize {
    let payload = match source.fetch_mappings().await {
        Ok(Some(payload)) if !payload.trim().is_empty() => payload,
        Ok(_) => {
            log.log(
                Level::WARN,
                &format!(
                    "No mappings received; keeping {} cached mapping(s)",
                    store.len()
                ),
            );
            return 0;
        }
        Err(e) => {
            log.log(
                Level::ERROR,
                &format!("Failed to fetch mappings: {e}; retrying next cycle"),
            );
            return 0;
        }
    };

    let pairs = parse_mapping_payload(&payload);
    let written = pairs.len();
    for (id, label) in pairs {
        store.set(id, label);
    }
    log.log(Level::DEBUG, &format!("Updated {written} mapping(s)"));
    written
}
