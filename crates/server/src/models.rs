// crates/server/src/models.rs
//! Wire-level domain types for the validation demo API.
//!
//! Every type that crosses the HTTP boundary serializes in camelCase,
//! regardless of the snake_case field names used internally.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a validation job.
///
/// `Failed` is a reserved terminal state: nothing in the current simulation
/// transitions into it, but it stays in the enum so a real error path can
/// reach it without a wire-format change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether the job still counts toward the "active jobs" dashboard metric.
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Processing)
    }
}

/// One validation run over a fixed-size batch of provider records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationJob {
    pub id: String,
    pub name: String,
    pub filename: String,
    pub status: JobStatus,
    /// Derived: floor(100 * completed_records / total_records).
    pub progress: u32,
    pub completed_records: u32,
    pub total_records: u32,
    pub created_at: String,
    pub auto_approved_percent: Option<f64>,
    pub manual_review_percent: Option<f64>,
    pub rejected_percent: Option<f64>,
    pub eta_remaining: Option<String>,
}

impl ValidationJob {
    /// Create a fresh job in `queued` state with zero progress.
    pub fn new(id: String, filename: String, total_records: u32) -> Self {
        Self {
            name: format!("Validation Job {id}"),
            id,
            filename,
            status: JobStatus::Queued,
            progress: 0,
            completed_records: 0,
            total_records,
            created_at: chrono::Utc::now().to_rfc3339(),
            auto_approved_percent: None,
            manual_review_percent: None,
            rejected_percent: None,
            eta_remaining: None,
        }
    }
}

/// Request body for `POST /api/v1/jobs`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCreate {
    pub filename: String,
    /// Requested batch size; demo mode may override it.
    #[serde(default = "default_total_records")]
    pub total_records: u32,
}

fn default_total_records() -> u32 {
    100
}

/// Tri-state outcome classification for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "auto-approve")]
    AutoApprove,
    #[serde(rename = "manual-review")]
    ManualReview,
    #[serde(rename = "reject")]
    Reject,
}

/// Review severity paired with the recommendation band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// One synthetic provider entity with its simulated confidence assessment.
///
/// The full record set for a job is generated once before progression begins
/// and is immutable afterwards; progression only reveals a growing prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRecord {
    pub id: String,
    pub name: String,
    pub npi: String,
    pub address: String,
    pub phone: String,
    pub specialty: String,
    pub license_status: String,
    /// Confidence before validation. Always <= overall_confidence, floored at 0.50.
    pub original_confidence: f64,
    /// Confidence after validation; drives recommendation and severity.
    pub overall_confidence: f64,
    pub npi_confidence: f64,
    pub address_confidence: f64,
    pub license_confidence: f64,
    pub recommendation: Recommendation,
    pub severity: Severity,
    pub validated_at: String,
    pub agents_involved: Vec<String>,
}

/// Paginated slice of a job's record set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsPage {
    pub items: Vec<ProviderRecord>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub has_more: bool,
}

/// Aggregate dashboard metrics across all jobs and records.
///
/// The `*_change` fields are randomized demo decoration carried over from the
/// original dashboard; they have no business meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_providers_validated: usize,
    pub total_providers_change: f64,
    pub average_confidence_score: f64,
    pub confidence_change: f64,
    pub active_jobs: usize,
    pub active_jobs_change: i64,
    pub records_requiring_review: usize,
    pub review_change: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_serializes_camel_case() {
        let job = ValidationJob::new("ab12cd34".into(), "roster.csv".into(), 100);
        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains("\"completedRecords\":0"));
        assert!(json.contains("\"totalRecords\":100"));
        assert!(json.contains("\"status\":\"queued\""));
        assert!(json.contains("\"autoApprovedPercent\":null"));
        assert!(json.contains("\"name\":\"Validation Job ab12cd34\""));
    }

    #[test]
    fn test_recommendation_wire_names() {
        assert_eq!(
            serde_json::to_string(&Recommendation::AutoApprove).unwrap(),
            "\"auto-approve\""
        );
        assert_eq!(
            serde_json::to_string(&Recommendation::ManualReview).unwrap(),
            "\"manual-review\""
        );
        assert_eq!(
            serde_json::to_string(&Recommendation::Reject).unwrap(),
            "\"reject\""
        );
    }

    #[test]
    fn test_job_create_defaults_total_records() {
        let body: JobCreate = serde_json::from_str(r#"{"filename":"a.csv"}"#).unwrap();
        assert_eq!(body.total_records, 100);

        let body: JobCreate =
            serde_json::from_str(r#"{"filename":"a.csv","totalRecords":25}"#).unwrap();
        assert_eq!(body.total_records, 25);
    }

    #[test]
    fn test_status_is_active() {
        assert!(JobStatus::Queued.is_active());
        assert!(JobStatus::Processing.is_active());
        assert!(!JobStatus::Completed.is_active());
        assert!(!JobStatus::Failed.is_active());
    }
}
