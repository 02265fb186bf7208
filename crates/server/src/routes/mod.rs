// crates/server/src/routes/mod.rs
//! API route handlers for the provider-pulse server.

pub mod health;
pub mod jobs;
pub mod metrics;
pub mod ws;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined API router.
///
/// Routes:
/// - GET  /                                    - App banner / health
/// - GET  /health                              - Health check for monitoring
/// - GET  /api/v1/jobs                         - List all validation jobs
/// - POST /api/v1/jobs                         - Create a job and start its engine
/// - GET  /api/v1/jobs/:job_id                 - Job detail
/// - GET  /api/v1/jobs/:job_id/records         - Paginated records
/// - GET  /api/v1/jobs/:job_id/records/:record_id - Single record
/// - POST /api/v1/jobs/:job_id/export          - Export acknowledgement (stub)
/// - GET  /api/v1/metrics/dashboard            - Aggregate dashboard metrics
/// - WS   /api/v1/ws/jobs/:job_id              - Real-time job event stream
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::router())
        .nest(
            "/api/v1",
            Router::new()
                .merge(jobs::router())
                .merge(metrics::router())
                .merge(ws::router()),
        )
        .with_state(state)
}
