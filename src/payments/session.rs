//! Hosted payment session lifecycle

use crate::error::{CheckoutError, ProviderResult};
use crate::payments::order::{Address, OrderSnapshot};
use crate::payments::traits::AlmaApi;
use crate::payments::types::{
    AddressPayload, CustomerDetails, PaymentDetails, PaymentPayload, PaymentSession,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Shown when the shopper comes back without a payment id
pub const MISSING_SESSION_MESSAGE: &str = "No Alma payment was found for this order.";

/// Where Alma sends the shopper after the hosted flow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectUrls {
    pub return_url: Option<String>,
    pub cancel_url: Option<String>,
}

/// Result of checking a returned session against the order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed(PaymentSession),
    NotConfirmed(PaymentSession),
}

impl Confirmation {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Confirmation::Confirmed(_))
    }
}

fn address_payload(address: &Address) -> AddressPayload {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();

    AddressPayload {
        first_name: field(&address.first_name),
        last_name: field(&address.last_name),
        line1: field(&address.street_address),
        line2: field(&address.suburb),
        postal_code: field(&address.postcode),
        city: field(&address.city),
        country: field(&address.country_iso_code),
    }
}

/// Builds Alma requests from orders and checks returned sessions
#[derive(Clone)]
pub struct PaymentSessionAdapter {
    api: Arc<dyn AlmaApi>,
    urls: RedirectUrls,
}

impl PaymentSessionAdapter {
    pub fn new(api: Arc<dyn AlmaApi>, urls: RedirectUrls) -> Self {
        Self { api, urls }
    }

    /// Map an order to the provider request shape.
    ///
    /// Optional fields become empty strings; the API rejects missing keys.
    pub fn build_payload(&self, order: &OrderSnapshot) -> Result<PaymentPayload, CheckoutError> {
        let customer = &order.customer;

        Ok(PaymentPayload {
            payment: PaymentDetails {
                purchase_amount: order.total_in_minor_units()?,
                return_url: self.urls.return_url.clone(),
                customer_cancel_url: self.urls.cancel_url.clone(),
                shipping_address: address_payload(&order.delivery),
                billing_address: address_payload(&order.billing),
            },
            customer: CustomerDetails {
                first_name: customer.first_name.clone().unwrap_or_default(),
                last_name: customer.last_name.clone().unwrap_or_default(),
                email: customer.email.clone().unwrap_or_default(),
                phone: customer.phone.clone().unwrap_or_default(),
            },
        })
    }

    /// Remote eligibility for an order already mapped by [`build_payload`](Self::build_payload)
    pub async fn check_eligibility(&self, payload: &PaymentPayload) -> ProviderResult<bool> {
        Ok(self.api.eligibility(payload).await?.eligible)
    }

    /// Start a hosted payment session. Failures are not retried.
    pub async fn create_session(
        &self,
        payload: &PaymentPayload,
    ) -> Result<PaymentSession, CheckoutError> {
        self.api.create_payment(payload).await.map_err(|source| {
            warn!("Alma payment creation failed: {}", source);
            CheckoutError::SessionCreationFailed { source }
        })
    }

    /// Verify the session the shopper returned with.
    ///
    /// The order total is recomputed from `order` on every call.
    pub async fn confirm_session(
        &self,
        session_id: Option<&str>,
        order: &OrderSnapshot,
    ) -> Result<Confirmation, CheckoutError> {
        let session_id = match session_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => {
                warn!("Alma confirmation attempted without a payment id");
                return Err(CheckoutError::NotFound {
                    details: vec![MISSING_SESSION_MESSAGE.to_string()],
                });
            }
        };

        let session = self.api.fetch_payment(session_id).await.map_err(|e| {
            warn!("Failed to fetch Alma payment {}: {}", session_id, e);
            CheckoutError::NotFound {
                details: e.messages(),
            }
        })?;

        // An unrepresentable total never matches
        let expected_amount = order
            .total_in_minor_units()
            .inspect_err(|e| warn!("Cannot check Alma payment {}: {}", session.id, e))
            .ok();
        let state_ok = session.state.is_accepted();
        let amount_ok = expected_amount == Some(session.purchase_amount);
        let plan_ok = session.first_installment_paid();

        info!(
            "Alma payment {} checks: state_ok={}, amount_ok={} (expected {:?}, got {}), plan_ok={}",
            session.id, state_ok, amount_ok, expected_amount, session.purchase_amount, plan_ok
        );

        if state_ok && amount_ok && plan_ok {
            Ok(Confirmation::Confirmed(session))
        } else {
            Ok(Confirmation::NotConfirmed(session))
        }
    }
}
