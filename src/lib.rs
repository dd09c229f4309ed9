//! Alma installment payments for the storefront checkout
//!
//! The crate decides whether Alma is offered for an order (configuration,
//! geo-zone and remote eligibility), starts hosted payment sessions, and
//! verifies and records the payment when the shopper returns.

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod payments;

pub use error::{AppError, AppResult};
