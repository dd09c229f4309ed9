//! Payment provider trait definitions

use crate::error::ProviderResult;
use crate::payments::types::{Eligibility, PaymentPayload, PaymentSession};
use async_trait::async_trait;

/// The three Alma API calls the checkout module consumes.
///
/// Implementations own transport concerns (authentication, timeouts). Callers
/// never retry.
#[async_trait]
pub trait AlmaApi: Send + Sync {
    /// Ask whether the order qualifies for installment payment
    async fn eligibility(&self, payload: &PaymentPayload) -> ProviderResult<Eligibility>;

    /// Create a hosted payment session
    ///
    /// # Returns
    /// * `PaymentSession` - carries the id and the hosted page URL
    async fn create_payment(&self, payload: &PaymentPayload) -> ProviderResult<PaymentSession>;

    /// Fetch a payment session by id
    async fn fetch_payment(&self, id: &str) -> ProviderResult<PaymentSession>;
}
