//! Liveness endpoint

use axum::extract::State;
use serde::Serialize;

use super::error::ApiError;
use super::response::Envelope;
use crate::state::AppState;
use crate::VERSION;

#[derive(Debug, Serialize)]
struct SystemInfo<'a> {
    environment: &'a str,
    version: &'static str,
}

/// `GET /v1/healthcheck`
pub async fn healthcheck(State(state): State<AppState>) -> Result<Envelope, ApiError> {
    Envelope::new().with("status", "available")?.with(
        "system_info",
        SystemInfo {
            environment: &state.config.service.environment,
            version: VERSION,
        },
    )
}
