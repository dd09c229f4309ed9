use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct InstallStatus {
    pub installed: bool,
    pub keys: Vec<String>,
}

pub async fn check(State(state): State<AppState>) -> Result<Json<InstallStatus>, ApiError> {
    Ok(Json(InstallStatus {
        installed: state.module.check().await?,
        keys: state.module.keys(),
    }))
}

pub async fn install(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.module.install().await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.module.remove().await?;
    Ok(StatusCode::NO_CONTENT)
}
