//! Banner, liveness, health and build identification endpoints

use axum::{routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Hello. This is Enrich Server." }))
}

/// GET /ping
pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "enrich-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build identification embedded at compile time
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_hash: env!("GIT_HASH").to_string(),
            build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
            build_profile: env!("BUILD_PROFILE").to_string(),
        }
    }
}

/// GET /buildinfo
pub async fn build_info() -> Json<BuildInfo> {
    Json(BuildInfo::current())
}

/// Build banner and health routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/ping", get(ping))
        .route("/health", get(health_check))
        .route("/buildinfo", get(build_info))
}
