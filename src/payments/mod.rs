//! Alma payment integration
//!
//! Eligibility gating, hosted session creation and confirmation for the
//! Alma installment payment method.

pub mod eligibility;
pub mod module;
pub mod order;
pub mod providers;
pub mod session;
pub mod settings;
pub mod traits;
pub mod types;
pub mod zone;

pub use eligibility::{DisabledReason, EligibilityDecision, EligibilityGate};
pub use module::{AlmaPaymentModule, ModuleOptions, PaymentOutcome};
pub use order::{Address, CustomerContact, OrderSnapshot};
pub use session::{Confirmation, PaymentSessionAdapter, RedirectUrls};
pub use settings::ModuleSettings;
pub use traits::AlmaApi;
