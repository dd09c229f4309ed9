//! Read-only view of the storefront order being paid for

use crate::error::CheckoutError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Postal address as held by the storefront; every field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub street_address: Option<String>,
    pub suburb: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
    /// ISO 3166-1 alpha-2 code
    pub country_iso_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerContact {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Snapshot of an order at checkout time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderSnapshot {
    pub billing_country_id: i64,
    pub billing_zone_id: i64,
    pub billing: Address,
    pub delivery: Address,
    pub customer: CustomerContact,
    /// Order total in major currency units
    pub total: Option<Decimal>,
}

impl OrderSnapshot {
    /// Order total in minor units, `round(total * 100)`; zero when unset.
    ///
    /// Totals whose minor-unit value does not fit in an `i64` are rejected
    /// with [`CheckoutError::InvalidAmount`].
    pub fn total_in_minor_units(&self) -> Result<i64, CheckoutError> {
        let Some(total) = self.total else {
            return Ok(0);
        };

        total
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|cents| cents.to_i64())
            .ok_or_else(|| CheckoutError::InvalidAmount {
                total: total.to_string(),
            })
    }
}
