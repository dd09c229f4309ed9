use axum::http::StatusCode;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::database;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub provider_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

/// Liveness plus a `SELECT 1` against the storefront database
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match &state.database {
        Some(pool) => Some(database::health_check(pool).await.is_ok()),
        None => None,
    };

    let (status, label) = match database {
        Some(false) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
        _ => (StatusCode::OK, "healthy"),
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: state.environment.clone(),
            provider_mode: state.provider_mode.clone(),
            database: database.map(|up| if up { "connected" } else { "unavailable" }.to_string()),
        }),
    )
}
