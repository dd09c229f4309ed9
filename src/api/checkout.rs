use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{ApiError, AppState};
use crate::payments::types::{CheckoutRedirect, ErrorPayload, Selection};
use crate::payments::{EligibilityDecision, OrderSnapshot, PaymentOutcome};

#[derive(Debug, Serialize, Deserialize)]
pub struct SelectionResponse {
    pub enabled: bool,
    pub decision: EligibilityDecision,
    pub selection: Selection,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub order_id: i64,
    #[serde(default)]
    pub session_id: Option<String>,
    pub order: OrderSnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfirmResponse {
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<CheckoutRedirect>,
}

/// Whether Alma should be listed for this order
pub async fn selection(
    State(state): State<AppState>,
    Json(order): Json<OrderSnapshot>,
) -> Result<Json<SelectionResponse>, ApiError> {
    let settings = state.module.settings().await?;
    let decision = state.module.evaluate(&settings, &order).await?;

    Ok(Json(SelectionResponse {
        enabled: decision.is_enabled(),
        decision,
        selection: state.module.selection(),
        sort_order: settings.sort_order,
    }))
}

pub async fn start_payment(
    State(state): State<AppState>,
    Json(order): Json<OrderSnapshot>,
) -> Json<CheckoutRedirect> {
    Json(state.module.start_payment(&order).await)
}

/// Verify the returned payment and record it on the order
pub async fn confirm(
    State(state): State<AppState>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let outcome = state
        .module
        .before_process(request.session_id.as_deref(), &request.order)
        .await;

    match outcome {
        PaymentOutcome::Confirmed {
            session_id,
            status_id,
        } => {
            state
                .module
                .after_process(request.order_id, &session_id, status_id)
                .await?;

            Ok(Json(ConfirmResponse {
                confirmed: true,
                session_id: Some(session_id),
                redirect: None,
            }))
        }
        PaymentOutcome::Failed { redirect } => Ok(Json(ConfirmResponse {
            confirmed: false,
            session_id: None,
            redirect: Some(redirect),
        })),
    }
}

pub async fn error(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<ErrorPayload> {
    Json(state.module.get_error(&params))
}
