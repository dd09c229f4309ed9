//! Alma request and response types

use serde::{Deserialize, Serialize};

/// Address as expected by the Alma API; every key is always present
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressPayload {
    pub first_name: String,
    pub last_name: String,
    pub line1: String,
    pub line2: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// Amount in minor currency units
    pub purchase_amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_cancel_url: Option<String>,
    pub shipping_address: AddressPayload,
    pub billing_address: AddressPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Body of eligibility and payment creation requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPayload {
    pub payment: PaymentDetails,
    pub customer: CustomerDetails,
}

/// Eligibility response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eligibility {
    #[serde(alias = "is_eligible", alias = "isEligible")]
    pub eligible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasons: Option<serde_json::Value>,
}

/// Lifecycle state of an Alma payment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    NotStarted,
    ScoredNo,
    ScoredMaybe,
    ScoredYes,
    InProgress,
    Paid,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PaymentState {
    /// States in which the shopper has completed the hosted flow
    pub fn is_accepted(self) -> bool {
        matches!(self, PaymentState::InProgress | PaymentState::Paid)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentState {
    Pending,
    Paid,
    #[default]
    #[serde(other)]
    Other,
}

/// One entry of the payment plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    #[serde(default)]
    pub state: InstallmentState,
    #[serde(default)]
    pub purchase_amount: i64,
    #[serde(default)]
    pub due_date: Option<i64>,
}

/// A hosted payment session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub state: PaymentState,
    #[serde(default)]
    pub purchase_amount: i64,
    #[serde(default)]
    pub payment_plan: Vec<Installment>,
}

impl PaymentSession {
    pub fn first_installment_paid(&self) -> bool {
        self.payment_plan
            .first()
            .map(|installment| installment.state == InstallmentState::Paid)
            .unwrap_or(false)
    }
}

/// Where the storefront should send the shopper next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum CheckoutRedirect {
    /// Hosted payment page; `on_submit` defers the redirect to the
    /// confirmation form submit
    Provider { url: String, on_submit: bool },
    /// Back to payment method selection with messages for the shopper
    PaymentSelection { messages: Vec<String> },
}

/// Entry shown in the list of payment methods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub id: String,
    pub module: String,
}

/// Error shown after a redirect back to the payment step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub title: String,
    pub error: String,
}
