//! Application error types
//!
//! Errors are grouped by where they originate: the Alma API (`External`),
//! storage and configuration (`Infrastructure`), or the checkout flow itself
//! (`Checkout`). Checkout errors are always recoverable by sending the shopper
//! back to the payment selection step.

use crate::database::error::DatabaseError;
use std::fmt;
use thiserror::Error;

/// Result type used across the crate
pub type AppResult<T> = Result<T, AppError>;

/// Result type for calls to the payment provider
pub type ProviderResult<T> = Result<T, ExternalError>;

/// Failures talking to a third-party service
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExternalError {
    #[error("{provider} API error (HTTP {status}): {message}")]
    PaymentProvider {
        provider: String,
        status: u16,
        message: String,
        /// Individual error entries reported by the provider, one per problem
        details: Vec<String>,
    },

    #[error("{service} request timed out after {seconds} seconds")]
    Timeout { service: String, seconds: u64 },

    #[error("{service} network error: {message}")]
    Network { service: String, message: String },

    #[error("Invalid response from {service}: {message}")]
    InvalidResponse { service: String, message: String },

    /// Rejected locally before anything was sent
    #[error("Invalid {service} request: {message}")]
    InvalidRequest { service: String, message: String },

    #[error("{service} credentials unavailable: {message}")]
    Credentials { service: String, message: String },
}

impl ExternalError {
    /// Messages suitable for showing to the shopper.
    ///
    /// Returns every sub-error the provider reported, or the top-level message
    /// when the provider gave none.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ExternalError::PaymentProvider {
                message, details, ..
            } => {
                if details.is_empty() {
                    vec![message.clone()]
                } else {
                    details.clone()
                }
            }
            other => vec![other.to_string()],
        }
    }
}

/// Storage and process-level failures
#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Recoverable failures of the checkout flow
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// The eligibility call failed; the payment method must stay hidden
    #[error("Eligibility check failed: {source}")]
    RemoteEligibilityFailure { source: ExternalError },

    #[error("Payment session could not be created: {source}")]
    SessionCreationFailed { source: ExternalError },

    /// No session id was supplied, or the provider could not return it
    #[error("Payment session not found")]
    NotFound { details: Vec<String> },

    /// Order total too large to express in minor units
    #[error("Order total {total} is out of range")]
    InvalidAmount { total: String },
}

impl CheckoutError {
    /// Messages to surface to the shopper on the payment selection step.
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            CheckoutError::RemoteEligibilityFailure { source }
            | CheckoutError::SessionCreationFailed { source } => source.messages(),
            CheckoutError::NotFound { details } => details.clone(),
            CheckoutError::InvalidAmount { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppErrorKind {
    #[error(transparent)]
    External(#[from] ExternalError),

    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

#[derive(Debug)]
pub struct AppError {
    pub kind: AppErrorKind,
    pub context: Option<String>,
}

impl AppError {
    pub fn new(kind: AppErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Infrastructure(
            InfrastructureError::Configuration {
                message: message.into(),
            },
        ))
    }

    /// True when the provider (rather than local storage) was at fault
    pub fn is_upstream(&self) -> bool {
        matches!(
            self.kind,
            AppErrorKind::External(_)
                | AppErrorKind::Checkout(CheckoutError::RemoteEligibilityFailure { .. })
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{} ({})", self.kind, context)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

impl From<ExternalError> for AppError {
    fn from(err: ExternalError) -> Self {
        Self::new(AppErrorKind::External(err))
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        Self::new(AppErrorKind::Infrastructure(InfrastructureError::Database(
            err,
        )))
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        Self::new(AppErrorKind::Checkout(err))
    }
}
