// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::realtime::SubscriberRegistry;
use crate::sim::EngineRunner;
use crate::store::{JobStore, RecordStore};

/// Shared application state accessible from all route handlers.
///
/// The stores are owned here (not process globals) and handed to the engine
/// runner explicitly; everything is process-lifetime.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Runtime settings (demo mode, ports).
    pub settings: Settings,
    /// Job id -> job state.
    pub jobs: Arc<JobStore>,
    /// Job id -> immutable generated record set.
    pub records: Arc<RecordStore>,
    /// Job id -> live WebSocket sinks.
    pub subscribers: Arc<SubscriberRegistry>,
    /// Spawns and tracks one progression task per job.
    pub engine: EngineRunner,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(settings: Settings) -> Arc<Self> {
        let jobs = Arc::new(JobStore::new());
        let records = Arc::new(RecordStore::new());
        let subscribers = Arc::new(SubscriberRegistry::new());
        let engine = EngineRunner::new(
            Arc::clone(&jobs),
            Arc::clone(&records),
            Arc::clone(&subscribers),
        );
        Arc::new(Self {
            start_time: Instant::now(),
            settings,
            jobs,
            records,
            subscribers,
            engine,
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
