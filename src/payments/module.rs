//! The storefront-facing Alma payment module
//!
//! Wires the eligibility gate and the session adapter to the configuration,
//! geo-zone and order history collaborators, and exposes the checkout
//! lifecycle the storefront drives.

use crate::database::repository::{
    ConfigurationStore, GeoZoneRepository, OrderHistoryRepository, OrderStatusRecord,
};
use crate::error::{AppError, AppResult, CheckoutError};
use crate::payments::eligibility::{EligibilityDecision, EligibilityGate};
use crate::payments::order::OrderSnapshot;
use crate::payments::session::{Confirmation, PaymentSessionAdapter, RedirectUrls};
use crate::payments::settings::{self, ModuleSettings};
use crate::payments::traits::AlmaApi;
use crate::payments::types::{CheckoutRedirect, ErrorPayload, Selection};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Static module metadata and behaviour switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOptions {
    pub code: String,
    pub title: String,
    pub description: String,
    /// Generic message shown when a payment fails
    pub error_text: String,
    /// Default title of the error box
    pub error_title: String,
    /// Order status recorded once a payment is confirmed
    pub order_status_id: i32,
    pub redirect_urls: RedirectUrls,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        Self {
            code: "alma".to_string(),
            title: "Alma - Pay in installments".to_string(),
            description: "Let your customers pay in 3 or 4 installments with Alma.".to_string(),
            error_text: "Your Alma payment could not be completed. Please try again or choose another payment method.".to_string(),
            error_title: "There has been an error processing your payment".to_string(),
            order_status_id: 1,
            redirect_urls: RedirectUrls::default(),
        }
    }
}

/// Outcome of checking the session the shopper returned with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Confirmed { session_id: String, status_id: i32 },
    Failed { redirect: CheckoutRedirect },
}

pub struct AlmaPaymentModule {
    options: ModuleOptions,
    config_store: Arc<dyn ConfigurationStore>,
    history: Arc<dyn OrderHistoryRepository>,
    gate: EligibilityGate,
    sessions: PaymentSessionAdapter,
}

impl AlmaPaymentModule {
    pub fn new(
        options: ModuleOptions,
        api: Arc<dyn AlmaApi>,
        config_store: Arc<dyn ConfigurationStore>,
        geo_zones: Arc<dyn GeoZoneRepository>,
        history: Arc<dyn OrderHistoryRepository>,
    ) -> Self {
        let sessions = PaymentSessionAdapter::new(api, options.redirect_urls.clone());
        let gate = EligibilityGate::new(geo_zones, sessions.clone());

        Self {
            options,
            config_store,
            history,
            gate,
            sessions,
        }
    }

    pub fn options(&self) -> &ModuleOptions {
        &self.options
    }

    pub fn keys(&self) -> Vec<String> {
        settings::keys()
    }

    pub async fn settings(&self) -> AppResult<ModuleSettings> {
        Ok(ModuleSettings::load(self.config_store.as_ref()).await?)
    }

    /// Whether the module has been installed
    pub async fn check(&self) -> AppResult<bool> {
        Ok(self.config_store.exists(settings::KEY_STATUS).await?)
    }

    pub async fn install(&self) -> AppResult<()> {
        self.config_store
            .install_defaults(&settings::default_entries())
            .await
            .map_err(|e| AppError::from(e).with_context("installing Alma settings"))?;
        info!("Alma module installed");
        Ok(())
    }

    pub async fn remove(&self) -> AppResult<()> {
        let removed = self
            .config_store
            .remove_all(&self.keys())
            .await
            .map_err(|e| AppError::from(e).with_context("removing Alma settings"))?;
        info!("Alma module removed ({} keys)", removed);
        Ok(())
    }

    pub fn selection(&self) -> Selection {
        Selection {
            id: self.options.code.clone(),
            module: self.options.title.clone(),
        }
    }

    /// Decide whether the method is offered for `order`
    pub async fn update_status(&self, order: &OrderSnapshot) -> AppResult<EligibilityDecision> {
        let settings = self.settings().await?;
        self.evaluate(&settings, order).await
    }

    /// Same as [`update_status`](Self::update_status) with settings the caller
    /// already loaded for this request
    pub async fn evaluate(
        &self,
        settings: &ModuleSettings,
        order: &OrderSnapshot,
    ) -> AppResult<EligibilityDecision> {
        self.gate.evaluate(settings, order).await
    }

    /// Create the hosted session and tell the storefront where to go.
    ///
    /// A failed creation sends the shopper back to payment selection.
    pub async fn start_payment(&self, order: &OrderSnapshot) -> CheckoutRedirect {
        let payload = match self.sessions.build_payload(order) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Not starting Alma payment: {}", err);
                return self.back_to_selection(&err);
            }
        };

        match self.sessions.create_session(&payload).await {
            Ok(session) => {
                info!("Redirecting shopper to Alma payment {}", session.id);
                CheckoutRedirect::Provider {
                    url: session.url,
                    on_submit: true,
                }
            }
            Err(err) => self.back_to_selection(&err),
        }
    }

    /// Verify the payment after the shopper returns from Alma
    pub async fn before_process(
        &self,
        session_id: Option<&str>,
        order: &OrderSnapshot,
    ) -> PaymentOutcome {
        match self.sessions.confirm_session(session_id, order).await {
            Ok(Confirmation::Confirmed(session)) => PaymentOutcome::Confirmed {
                session_id: session.id,
                status_id: self.options.order_status_id,
            },
            Ok(Confirmation::NotConfirmed(session)) => {
                warn!("Alma payment {} not confirmed", session.id);
                PaymentOutcome::Failed {
                    redirect: CheckoutRedirect::PaymentSelection {
                        messages: vec![self.options.error_text.clone()],
                    },
                }
            }
            Err(err) => PaymentOutcome::Failed {
                redirect: self.back_to_selection(&err),
            },
        }
    }

    /// Record the confirmed payment in the order history
    pub async fn after_process(
        &self,
        order_id: i64,
        session_id: &str,
        status_id: i32,
    ) -> AppResult<OrderStatusRecord> {
        let record = OrderStatusRecord {
            order_id,
            status_id,
            comment: format!("Alma payment ID: {}", session_id),
            customer_notified: -1,
            created_at: Utc::now(),
        };

        self.history.append(&record).await.map_err(|e| {
            AppError::from(e).with_context(format!("recording Alma payment {}", session_id))
        })?;
        info!("Recorded Alma payment {} on order {}", session_id, order_id);
        Ok(record)
    }

    /// Error previously passed along in the redirect query string
    pub fn get_error(&self, params: &HashMap<String, String>) -> ErrorPayload {
        let title = params
            .get("title")
            .filter(|title| !title.is_empty())
            .map(|title| decode_param(title))
            .unwrap_or_else(|| self.options.error_title.clone());

        let error = params
            .get("error")
            .map(|error| decode_param(error))
            .unwrap_or_default();

        ErrorPayload { title, error }
    }

    fn back_to_selection(&self, err: &CheckoutError) -> CheckoutRedirect {
        let mut messages = vec![self.options.error_text.clone()];
        messages.extend(err.user_messages());
        messages.dedup();
        CheckoutRedirect::PaymentSelection { messages }
    }
}

fn decode_param(raw: &str) -> String {
    let decoded = urlencoding::decode(&raw.replace('+', " "))
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    strip_slashes(&decoded)
}

/// Remove backslash escapes; `\\` becomes a single backslash
fn strip_slashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
