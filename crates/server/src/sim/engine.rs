// crates/server/src/sim/engine.rs
//! Per-job progression engine.
//!
//! Each created job gets exactly one background task that generates the full
//! record set up front, then advances `completed_records` one record per
//! timed tick, mutating the job store and fanning events out to subscribers.
//! The task runs to completion; there is no cancellation path today, but the
//! runner keeps an abort handle per job so one can be added later.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::AbortHandle;

use crate::models::{JobStatus, Recommendation};
use crate::realtime::{JobEvent, SubscriberRegistry};
use crate::sim::generator::generate;
use crate::store::{JobStore, RecordStore};

/// Inter-tick base delay, tiered by dataset size so demo duration stays
/// bounded: a 1000-record job finishes in ~50s, a 50-record job in ~25s.
fn base_delay(total_records: u32) -> Duration {
    if total_records > 500 {
        Duration::from_millis(50)
    } else if total_records > 100 {
        Duration::from_millis(200)
    } else {
        Duration::from_millis(500)
    }
}

/// Per-tick jitter on top of the base delay, in milliseconds.
fn jitter_ms(rng: &mut impl Rng) -> i64 {
    rng.gen_range(-10..=20)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Handle to one running progression task.
pub struct JobHandle {
    abort: AbortHandle,
}

impl JobHandle {
    /// Whether the underlying task has finished.
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

/// Spawns and tracks the progression task for every job.
pub struct EngineRunner {
    jobs: Arc<JobStore>,
    records: Arc<RecordStore>,
    subscribers: Arc<SubscriberRegistry>,
    handles: RwLock<HashMap<String, JobHandle>>,
}

impl EngineRunner {
    pub fn new(
        jobs: Arc<JobStore>,
        records: Arc<RecordStore>,
        subscribers: Arc<SubscriberRegistry>,
    ) -> Self {
        Self {
            jobs,
            records,
            subscribers,
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Spawn the progression task for a freshly created job.
    ///
    /// Called exactly once per job id, from the creation route. A second
    /// start for the same id is refused and logged rather than spawning a
    /// competing writer.
    pub fn start(&self, job_id: &str) {
        {
            let handles = match self.handles.read() {
                Ok(h) => h,
                Err(e) => {
                    tracing::error!("RwLock poisoned reading engine handles: {e}");
                    return;
                }
            };
            if handles.contains_key(job_id) {
                tracing::warn!(job_id = %job_id, "Progression engine already started for job");
                return;
            }
        }

        let jobs = Arc::clone(&self.jobs);
        let records = Arc::clone(&self.records);
        let subscribers = Arc::clone(&self.subscribers);
        let id = job_id.to_string();

        let task = tokio::spawn(async move {
            run_job(&id, &jobs, &records, &subscribers).await;
        });

        match self.handles.write() {
            Ok(mut handles) => {
                handles.insert(
                    job_id.to_string(),
                    JobHandle {
                        abort: task.abort_handle(),
                    },
                );
            }
            Err(e) => tracing::error!("RwLock poisoned writing engine handles: {e}"),
        }
    }

    /// Handle lookup, primarily for introspection and tests.
    pub fn is_finished(&self, job_id: &str) -> Option<bool> {
        match self.handles.read() {
            Ok(handles) => handles.get(job_id).map(|h| h.is_finished()),
            Err(e) => {
                tracing::error!("RwLock poisoned reading engine handles: {e}");
                None
            }
        }
    }
}

/// The progression task body: queued -> processing (one tick per record) ->
/// completed, emitting events along the way.
async fn run_job(
    job_id: &str,
    jobs: &JobStore,
    records: &RecordStore,
    subscribers: &SubscriberRegistry,
) {
    let Some(job) = jobs.get(job_id) else {
        tracing::warn!(job_id = %job_id, "Engine started for unknown job");
        return;
    };
    let total = job.total_records;

    let mut rng = StdRng::from_entropy();

    // The whole record set exists before the first tick; progression only
    // reveals a growing prefix of it.
    let all_records = Arc::new(generate(job_id, total, &mut rng));
    records.put(job_id, all_records.as_ref().clone());

    let base = base_delay(total);
    tracing::info!(
        job_id = %job_id,
        total_records = total,
        tick_ms = base.as_millis() as u64,
        "Job processing started"
    );

    for completed in 1..=total {
        let delay_ms = (base.as_millis() as i64 + jitter_ms(&mut rng)).max(0) as u64;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        let prefix = &all_records[..completed as usize];
        let auto_approved = prefix
            .iter()
            .filter(|r| r.recommendation == Recommendation::AutoApprove)
            .count();
        let manual_review = prefix
            .iter()
            .filter(|r| r.recommendation == Recommendation::ManualReview)
            .count();
        let rejected = prefix
            .iter()
            .filter(|r| r.recommendation == Recommendation::Reject)
            .count();

        let progress = (completed as u64 * 100 / total as u64) as u32;
        let remaining_secs =
            ((total - completed) as u128 * base.as_millis()).div_ceil(1000) as u64;

        jobs.update(job_id, |job| {
            job.status = JobStatus::Processing;
            job.completed_records = completed;
            job.progress = progress;
            job.auto_approved_percent =
                Some(round1(auto_approved as f64 / completed as f64 * 100.0));
            job.manual_review_percent =
                Some(round1(manual_review as f64 / completed as f64 * 100.0));
            job.rejected_percent = Some(round1(rejected as f64 / completed as f64 * 100.0));
            job.eta_remaining = Some(format!("{remaining_secs}s"));
        });

        subscribers.broadcast(
            job_id,
            &JobEvent::ProgressUpdate {
                progress,
                completed_records: completed,
            },
        );

        // Every 5th record also announces itself individually.
        if completed % 5 == 0 {
            subscribers.broadcast(
                job_id,
                &JobEvent::RecordCompleted {
                    record_id: all_records[completed as usize - 1].id.clone(),
                    status: "completed".to_string(),
                },
            );
        }

        tracing::debug!(job_id = %job_id, completed, total, progress, "Tick");
    }

    jobs.update(job_id, |job| {
        job.status = JobStatus::Completed;
        job.progress = 100;
        job.completed_records = total;
        job.eta_remaining = None;
    });
    subscribers.broadcast(
        job_id,
        &JobEvent::JobCompleted {
            job_id: job_id.to_string(),
        },
    );
    tracing::info!(job_id = %job_id, total_records = total, "Job completed");
}
