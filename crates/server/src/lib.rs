// crates/server/src/lib.rs
//! Provider-pulse server library.
//!
//! An Axum-based demo backend that simulates asynchronous provider-validation
//! jobs: clients create a job, a background engine advances it record by
//! record on a timer, and progress is observable both by polling the REST
//! API and by subscribing to a per-job WebSocket event stream. Everything is
//! in-memory and process-lifetime; there is no persistence.

pub mod config;
pub mod error;
pub mod models;
pub mod realtime;
pub mod routes;
pub mod sim;
pub mod state;
pub mod store;

pub use config::Settings;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::api_routes;
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware.
///
/// This sets up:
/// - API routes (health, jobs, records, metrics, WebSocket)
/// - CORS for the frontend dev server (allows any origin)
/// - Request tracing
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api_routes(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::time::Duration;
    use tower::ServiceExt;

    /// App with demo mode off so requested record counts are honored.
    fn test_app() -> (Arc<AppState>, Router) {
        let state = AppState::new(Settings {
            demo_mode: false,
            ..Settings::default()
        });
        (state.clone(), create_app(state))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    /// Create a 10-record job and let the spawned engine run its generation
    /// step (the record set exists before the first tick fires).
    async fn create_ten_record_job(app: &Router) -> String {
        let (status, job) = post_json(
            app.clone(),
            "/api/v1/jobs",
            r#"{"filename":"roster.csv","totalRecords":10}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        tokio::time::sleep(Duration::from_millis(1)).await;
        job["id"].as_str().unwrap().to_string()
    }

    // ========================================================================
    // Health Endpoints
    // ========================================================================

    #[tokio::test]
    async fn test_root_endpoint() {
        let (_state, app) = test_app();
        let (status, json) = get(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["app"], "provider-pulse");
        assert_eq!(json["status"], "running");
        assert!(json["version"].is_string());
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (_state, app) = test_app();
        let (status, json) = get(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
    }

    // ========================================================================
    // Job Creation
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_create_job_returns_queued_snapshot() {
        let (_state, app) = test_app();
        let (status, job) = post_json(
            app,
            "/api/v1/jobs",
            r#"{"filename":"roster.csv","totalRecords":10}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(job["status"], "queued");
        assert_eq!(job["progress"], 0);
        assert_eq!(job["completedRecords"], 0);
        assert_eq!(job["totalRecords"], 10);
        assert_eq!(job["filename"], "roster.csv");
        assert_eq!(job["id"].as_str().unwrap().len(), 8);
        assert!(job["autoApprovedPercent"].is_null());
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_mode_overrides_record_count() {
        let state = AppState::new(Settings {
            demo_mode: true,
            demo_records_per_job: 77,
            ..Settings::default()
        });
        let app = create_app(state);

        let (status, job) = post_json(
            app,
            "/api/v1/jobs",
            r#"{"filename":"roster.csv","totalRecords":10}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(job["totalRecords"], 77);
    }

    #[tokio::test(start_paused = true)]
    async fn test_created_job_appears_in_list() {
        let (_state, app) = test_app();
        let id = create_ten_record_job(&app).await;

        let (status, jobs) = get(app, "/api/v1/jobs").await;
        assert_eq!(status, StatusCode::OK);
        let jobs = jobs.as_array().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0]["id"], id.as_str());
    }

    // ========================================================================
    // Not-Found Paths
    // ========================================================================

    #[tokio::test]
    async fn test_unknown_job_is_404_everywhere() {
        let (_state, app) = test_app();

        let (status, json) = get(app.clone(), "/api/v1/jobs/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Job not found");

        let (status, _) = get(app.clone(), "/api/v1/jobs/nope/records").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get(app.clone(), "/api/v1/jobs/nope/records/nope-rec-0000").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = post_json(app, "/api/v1/jobs/nope/export", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_404_for_unknown_route() {
        let (_state, app) = test_app();
        let (status, _) = get(app, "/api/v1/nonexistent").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // ========================================================================
    // Records & Pagination
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_records_page_two_of_ten() {
        let (_state, app) = test_app();
        let id = create_ten_record_job(&app).await;

        let (status, page) =
            get(app, &format!("/api/v1/jobs/{id}/records?page=2&pageSize=4")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["total"], 10);
        assert_eq!(page["page"], 2);
        assert_eq!(page["pageSize"], 4);
        assert_eq!(page["hasMore"], true);
        let items = page["items"].as_array().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0]["id"], format!("{id}-rec-0004"));
        assert_eq!(items[3]["id"], format!("{id}-rec-0007"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_records_last_page_has_no_more() {
        let (_state, app) = test_app();
        let id = create_ten_record_job(&app).await;

        let (status, page) =
            get(app, &format!("/api/v1/jobs/{id}/records?page=3&pageSize=4")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["items"].as_array().unwrap().len(), 2);
        assert_eq!(page["hasMore"], false);
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_detail_and_missing_record() {
        let (_state, app) = test_app();
        let id = create_ten_record_job(&app).await;

        let (status, record) =
            get(app.clone(), &format!("/api/v1/jobs/{id}/records/{id}-rec-0003")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["id"], format!("{id}-rec-0003"));
        assert!(record["overallConfidence"].is_number());
        assert!(record["recommendation"].is_string());

        let (status, json) =
            get(app, &format!("/api/v1/jobs/{id}/records/{id}-rec-9999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Record not found");
    }

    // ========================================================================
    // Export Stub
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_export_acknowledges_without_writing() {
        let (_state, app) = test_app();
        let id = create_ten_record_job(&app).await;

        let (status, ack) =
            post_json(app, &format!("/api/v1/jobs/{id}/export?format=xlsx"), "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack["jobId"], id.as_str());
        assert_eq!(ack["format"], "xlsx");
        assert!(ack["message"].as_str().unwrap().contains(&id));
    }

    // ========================================================================
    // Dashboard Metrics
    // ========================================================================

    #[tokio::test]
    async fn test_dashboard_metrics_empty() {
        let (_state, app) = test_app();
        let (status, metrics) = get(app, "/api/v1/metrics/dashboard").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(metrics["totalProvidersValidated"], 0);
        assert_eq!(metrics["activeJobs"], 0);
        assert_eq!(metrics["averageConfidenceScore"], 0.0);
        assert_eq!(metrics["recordsRequiringReview"], 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dashboard_metrics_count_stored_records() {
        let (_state, app) = test_app();
        let _id = create_ten_record_job(&app).await;

        let (status, metrics) = get(app, "/api/v1/metrics/dashboard").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(metrics["totalProvidersValidated"], 10);
        assert_eq!(metrics["activeJobs"], 1);
        // Average of overall confidences scaled to a percentage.
        let avg = metrics["averageConfidenceScore"].as_f64().unwrap();
        assert!((70.0..=99.0).contains(&avg), "avg {avg}");
    }

    // ========================================================================
    // End-to-End Progression
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_job_runs_to_completion_behind_the_api() {
        let (state, app) = test_app();
        let id = create_ten_record_job(&app).await;

        tokio::time::timeout(Duration::from_secs(600), async {
            loop {
                let (_, job) = get(app.clone(), &format!("/api/v1/jobs/{id}")).await;
                let completed = job["completedRecords"].as_u64().unwrap();
                let progress = job["progress"].as_u64().unwrap();
                assert!(completed <= 10);
                assert_eq!(progress, completed * 100 / 10);
                if job["status"] == "completed" {
                    assert_eq!(progress, 100);
                    assert!(job["etaRemaining"].is_null());
                    let sum = job["autoApprovedPercent"].as_f64().unwrap()
                        + job["manualReviewPercent"].as_f64().unwrap()
                        + job["rejectedPercent"].as_f64().unwrap();
                    assert!((sum - 100.0).abs() <= 0.2);
                    break;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        })
        .await
        .expect("job did not complete");

        assert_eq!(state.engine.is_finished(&id), Some(true));
    }

    // ========================================================================
    // CORS
    // ========================================================================

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let (_state, app) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("Origin", "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let allow_origin = response.headers().get("access-control-allow-origin");
        assert!(allow_origin.is_some());
        assert_eq!(allow_origin.unwrap(), "*");
    }
}
