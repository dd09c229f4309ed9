//! HTTP surface used by the storefront to drive the Alma checkout steps

pub mod admin;
pub mod checkout;
pub mod health;

use crate::error::AppError;
use crate::payments::AlmaPaymentModule;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub module: Arc<AlmaPaymentModule>,
    pub environment: String,
    /// `test` or `live`
    pub provider_mode: String,
    /// Pool probed by `/health`; `None` when the collaborators are not
    /// database-backed
    pub database: Option<PgPool>,
}

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_upstream() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        error!("Request failed with {}: {}", status, self.0);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/payments/alma/selection", post(checkout::selection))
        .route("/payments/alma/sessions", post(checkout::start_payment))
        .route("/payments/alma/confirm", post(checkout::confirm))
        .route("/payments/alma/error", get(checkout::error))
        .route("/admin/alma", get(admin::check).delete(admin::remove))
        .route("/admin/alma/install", post(admin::install))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
