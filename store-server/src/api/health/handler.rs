//! Health API handlers

use axum::Json;
use serde::Serialize;

use crate::utils::{AppResponse, ok};

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /api/health - liveness probe, no auth
pub async fn health() -> Json<AppResponse<HealthStatus>> {
    ok(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
