//! Decides whether Alma is offered for an order

use crate::database::repository::GeoZoneRepository;
use crate::error::{AppResult, CheckoutError};
use crate::payments::order::OrderSnapshot;
use crate::payments::session::PaymentSessionAdapter;
use crate::payments::settings::ModuleSettings;
use crate::payments::zone;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisabledReason {
    /// Turned off by the administrator
    ConfigurationDisabled,
    /// Billing address outside the configured geo-zone
    ZoneMismatch,
    /// Alma declined the order
    NotEligible,
    /// Order total cannot be sent to Alma
    InvalidAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum EligibilityDecision {
    Enabled,
    Disabled(DisabledReason),
}

impl EligibilityDecision {
    pub fn is_enabled(&self) -> bool {
        matches!(self, EligibilityDecision::Enabled)
    }
}

/// Runs the enabled flag, the zone check and the remote check in that order,
/// stopping at the first one that disables the method.
#[derive(Clone)]
pub struct EligibilityGate {
    geo_zones: Arc<dyn GeoZoneRepository>,
    sessions: PaymentSessionAdapter,
}

impl EligibilityGate {
    pub fn new(geo_zones: Arc<dyn GeoZoneRepository>, sessions: PaymentSessionAdapter) -> Self {
        Self {
            geo_zones,
            sessions,
        }
    }

    /// Evaluate the order. A failed remote check is returned as
    /// [`CheckoutError::RemoteEligibilityFailure`], never as enabled.
    pub async fn evaluate(
        &self,
        settings: &ModuleSettings,
        order: &OrderSnapshot,
    ) -> AppResult<EligibilityDecision> {
        if !settings.enabled {
            debug!("Alma disabled by configuration");
            return Ok(EligibilityDecision::Disabled(
                DisabledReason::ConfigurationDisabled,
            ));
        }

        if settings.has_zone_restriction() {
            let entries = self
                .geo_zones
                .entries(settings.zone_id, order.billing_country_id)
                .await?;

            if !zone::matches(
                settings.zone_id,
                order.billing_country_id,
                order.billing_zone_id,
                &entries,
            ) {
                debug!(
                    "Alma disabled: country {} zone {} outside geo-zone {}",
                    order.billing_country_id, order.billing_zone_id, settings.zone_id
                );
                return Ok(EligibilityDecision::Disabled(DisabledReason::ZoneMismatch));
            }
        }

        let payload = match self.sessions.build_payload(order) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Alma disabled: {}", e);
                return Ok(EligibilityDecision::Disabled(DisabledReason::InvalidAmount));
            }
        };

        let eligible = self
            .sessions
            .check_eligibility(&payload)
            .await
            .map_err(|source| {
                warn!("Alma eligibility check failed, hiding payment method: {}", source);
                CheckoutError::RemoteEligibilityFailure { source }
            })?;

        if eligible {
            info!("Alma enabled for order");
            Ok(EligibilityDecision::Enabled)
        } else {
            info!("Alma disabled: order not eligible");
            Ok(EligibilityDecision::Disabled(DisabledReason::NotEligible))
        }
    }
}
