// crates/server/src/routes/health.rs
//! Health check endpoints.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Response for the root banner endpoint.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct RootResponse {
    pub app: String,
    pub version: String,
    pub status: String,
    pub uptime_secs: u64,
}

/// GET / - App banner with version and uptime.
async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        app: "provider-pulse".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        uptime_secs: state.uptime_secs(),
    })
}

/// GET /health - Health check for monitoring.
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Create the health routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_response_serialization() {
        let response = RootResponse {
            app: "provider-pulse".to_string(),
            version: "0.3.0".to_string(),
            status: "running".to_string(),
            uptime_secs: 42,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"app\":\"provider-pulse\""));
        assert!(json.contains("\"status\":\"running\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }
}
