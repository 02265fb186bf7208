// crates/server/src/routes/jobs.rs
//! REST surface for validation jobs and their records.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::{JobCreate, ProviderRecord, RecordsPage, ValidationJob};
use crate::state::AppState;

/// Build the jobs sub-router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route("/jobs/{job_id}", get(get_job_detail))
        .route("/jobs/{job_id}/records", get(get_job_records))
        .route("/jobs/{job_id}/records/{record_id}", get(get_record_detail))
        .route("/jobs/{job_id}/export", post(export_job))
}

/// GET /api/v1/jobs - All validation jobs.
async fn list_jobs(State(state): State<Arc<AppState>>) -> Json<Vec<ValidationJob>> {
    Json(state.jobs.list())
}

/// POST /api/v1/jobs - Create a job and spawn its progression engine.
///
/// In demo mode the requested record count is replaced with the configured
/// demo batch size. The response is the `queued` snapshot; progression and
/// event emission start in the background immediately.
async fn create_job(
    State(state): State<Arc<AppState>>,
    Json(body): Json<JobCreate>,
) -> Json<ValidationJob> {
    let job_id = uuid::Uuid::new_v4().to_string()[..8].to_string();
    let total_records = state.settings.effective_total_records(body.total_records);

    let job = ValidationJob::new(job_id.clone(), body.filename, total_records);
    state.jobs.insert(job.clone());
    state.engine.start(&job_id);

    tracing::info!(
        job_id = %job_id,
        filename = %job.filename,
        total_records,
        "Job created"
    );
    Json(job)
}

/// GET /api/v1/jobs/:job_id - Job detail.
async fn get_job_detail(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<ValidationJob>> {
    state
        .jobs
        .get(&job_id)
        .map(Json)
        .ok_or(ApiError::JobNotFound(job_id))
}

/// Query parameters for the records listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordsQuery {
    #[serde(default = "default_page")]
    page: usize,
    #[serde(default = "default_page_size", alias = "page_size")]
    page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    50
}

/// GET /api/v1/jobs/:job_id/records?page=1&pageSize=50 - Paginated records.
async fn get_job_records(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
    Query(query): Query<RecordsQuery>,
) -> ApiResult<Json<RecordsPage>> {
    if state.jobs.get(&job_id).is_none() {
        return Err(ApiError::JobNotFound(job_id));
    }

    let (items, total) = state.records.page(&job_id, query.page, query.page_size);
    let has_more = query.page * query.page_size < total;

    Ok(Json(RecordsPage {
        items,
        total,
        page: query.page,
        page_size: query.page_size,
        has_more,
    }))
}

/// GET /api/v1/jobs/:job_id/records/:record_id - Single record detail.
async fn get_record_detail(
    State(state): State<Arc<AppState>>,
    Path((job_id, record_id)): Path<(String, String)>,
) -> ApiResult<Json<ProviderRecord>> {
    if state.jobs.get(&job_id).is_none() {
        return Err(ApiError::JobNotFound(job_id));
    }
    state
        .records
        .find(&job_id, &record_id)
        .map(Json)
        .ok_or(ApiError::RecordNotFound(record_id))
}

/// Query parameters for the export stub.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ExportQuery {
    format: Option<String>,
}

/// POST /api/v1/jobs/:job_id/export?format=csv - Export acknowledgement.
///
/// No file is written; the endpoint only validates the job and echoes the
/// requested format back.
async fn export_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    if state.jobs.get(&job_id).is_none() {
        return Err(ApiError::JobNotFound(job_id));
    }
    let format = query.format.unwrap_or_else(|| "csv".to_string());
    Ok(Json(serde_json::json!({
        "message": format!("Export initiated for job {job_id} in {format} format"),
        "jobId": job_id,
        "format": format,
    })))
}
