// crates/server/src/realtime.rs
//! Real-time event distribution for job progression.
//!
//! The progression engine pushes [`JobEvent`]s through a
//! [`SubscriberRegistry`]; each live WebSocket connection owns one sink.
//! Delivery to one sink is independent of every other sink, and a failed
//! delivery is absorbed here rather than propagated to the engine.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use serde::Serialize;
use tokio::sync::mpsc;

/// Event pushed to subscribers of one job.
///
/// Serializes as `{"type": "...", "data": {...}}` with camelCase data fields,
/// matching what the frontend's job WebSocket hook expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum JobEvent {
    /// Emitted once per progression tick.
    #[serde(rename_all = "camelCase")]
    ProgressUpdate { progress: u32, completed_records: u32 },
    /// Emitted every 5th completed record.
    #[serde(rename_all = "camelCase")]
    RecordCompleted { record_id: String, status: String },
    /// Terminal event; exactly one per job run.
    #[serde(rename_all = "camelCase")]
    JobCompleted { job_id: String },
}

/// Identifier for one registered sink, unique across the process.
pub type SubscriberId = u64;

/// Map of job id to the live sinks subscribed to that job.
///
/// Unbounded mpsc channels give per-sink FIFO delivery in emission order;
/// the registry never applies backpressure to the engine. Sinks are removed
/// only by [`unsubscribe`](Self::unsubscribe) (the WebSocket handler calls it
/// on disconnect) — a sink whose receiver is gone simply fails its sends
/// until then, which broadcast tolerates.
#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: AtomicU64,
    sinks: RwLock<HashMap<String, HashMap<SubscriberId, mpsc::UnboundedSender<JobEvent>>>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new sink for a job. Returns the subscriber id (needed for
    /// unsubscribe) and the receiving half of the sink.
    pub fn subscribe(&self, job_id: &str) -> (SubscriberId, mpsc::UnboundedReceiver<JobEvent>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        match self.sinks.write() {
            Ok(mut map) => {
                map.entry(job_id.to_string()).or_default().insert(id, tx);
            }
            Err(e) => tracing::error!("RwLock poisoned subscribing: {e}"),
        }
        tracing::debug!(job_id = %job_id, subscriber_id = id, "Subscriber registered");
        (id, rx)
    }

    /// Remove a sink, dropping the job's subscriber set once it empties.
    pub fn unsubscribe(&self, job_id: &str, id: SubscriberId) {
        match self.sinks.write() {
            Ok(mut map) => {
                if let Some(set) = map.get_mut(job_id) {
                    set.remove(&id);
                    if set.is_empty() {
                        map.remove(job_id);
                    }
                }
            }
            Err(e) => tracing::error!("RwLock poisoned unsubscribing: {e}"),
        }
        tracing::debug!(job_id = %job_id, subscriber_id = id, "Subscriber removed");
    }

    /// Deliver an event to every sink currently subscribed to the job.
    ///
    /// Senders are snapshotted under the read lock, so a disconnect racing
    /// the broadcast at worst sees one final event in a channel nobody reads.
    /// A closed sink is logged and skipped; it never blocks the remaining
    /// deliveries or the engine tick.
    pub fn broadcast(&self, job_id: &str, event: &JobEvent) {
        let targets: Vec<(SubscriberId, mpsc::UnboundedSender<JobEvent>)> =
            match self.sinks.read() {
                Ok(map) => map
                    .get(job_id)
                    .map(|set| set.iter().map(|(id, tx)| (*id, tx.clone())).collect())
                    .unwrap_or_default(),
                Err(e) => {
                    tracing::error!("RwLock poisoned broadcasting: {e}");
                    return;
                }
            };

        for (id, tx) in targets {
            if tx.send(event.clone()).is_err() {
                tracing::debug!(
                    job_id = %job_id,
                    subscriber_id = id,
                    "Dropping event for closed subscriber"
                );
            }
        }
    }

    /// Number of live sinks for a job.
    pub fn subscriber_count(&self, job_id: &str) -> usize {
        match self.sinks.read() {
            Ok(map) => map.get(job_id).map(|s| s.len()).unwrap_or(0),
            Err(e) => {
                tracing::error!("RwLock poisoned reading sinks: {e}");
                0
            }
        }
    }
}
