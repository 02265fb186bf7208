// crates/server/src/routes/metrics.rs
//! Aggregate dashboard metrics endpoint.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use rand::Rng;

use crate::models::DashboardMetrics;
use crate::state::AppState;

/// Build the metrics sub-router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/metrics/dashboard", get(dashboard_metrics))
}

/// GET /api/v1/metrics/dashboard - Aggregated dashboard metrics.
///
/// Counts come from the live stores; the `*_change` fields are randomized
/// demo decoration with no underlying time series behind them.
async fn dashboard_metrics(State(state): State<Arc<AppState>>) -> Json<DashboardMetrics> {
    let totals = state.records.totals();
    let average_confidence_score = if totals.total > 0 {
        let avg = totals.confidence_sum / totals.total as f64 * 100.0;
        (avg * 10.0).round() / 10.0
    } else {
        0.0
    };

    let mut rng = rand::thread_rng();
    Json(DashboardMetrics {
        total_providers_validated: totals.total,
        total_providers_change: (rng.gen_range(5.0..15.0f64) * 10.0).round() / 10.0,
        average_confidence_score,
        confidence_change: (rng.gen_range(0.5..2.0f64) * 10.0).round() / 10.0,
        active_jobs: state.jobs.count_active(),
        active_jobs_change: rng.gen_range(-2..=3),
        records_requiring_review: totals.manual_review,
        review_change: rng.gen_range(-10..=20),
    })
}
