//! Administrator settings stored in the configuration table

use crate::database::error::DatabaseError;
use crate::database::repository::{ConfigurationEntry, ConfigurationStore};

pub const KEY_STATUS: &str = "MODULE_PAYMENT_ALMA_STATUS";
pub const KEY_SORT_ORDER: &str = "MODULE_PAYMENT_ALMA_SORT_ORDER";
pub const KEY_ZONE: &str = "MODULE_PAYMENT_ALMA_ZONE";
pub const KEY_API_KEY_TEST: &str = "MODULE_PAYMENT_ALMA_API_KEY_TEST";

/// Configuration group of payment modules in the storefront admin
const PAYMENT_GROUP_ID: i32 = 6;

/// Every key owned by the module
pub fn keys() -> Vec<String> {
    [KEY_STATUS, KEY_SORT_ORDER, KEY_ZONE, KEY_API_KEY_TEST]
        .iter()
        .map(|key| key.to_string())
        .collect()
}

/// Rows inserted when the module is installed
pub fn default_entries() -> Vec<ConfigurationEntry> {
    let entry = |key: &str, value: &str, title: &str, description: &str| ConfigurationEntry {
        key: key.to_string(),
        value: value.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        group_id: PAYMENT_GROUP_ID,
        sort_order: 0,
    };

    vec![
        entry(
            KEY_STATUS,
            "True",
            "Enable Alma Module",
            "Do you want to accept Alma installment payments?",
        ),
        entry(
            KEY_SORT_ORDER,
            "0",
            "Sort order of display.",
            "Sort order of display. Lowest is displayed first.",
        ),
        entry(
            KEY_ZONE,
            "0",
            "Payment Zone",
            "If a zone is selected, only enable this payment method for that zone.",
        ),
        entry(
            KEY_API_KEY_TEST,
            "",
            "Test API key",
            "Alma API key used in test mode.",
        ),
    ]
}

/// Typed view of the module configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSettings {
    pub enabled: bool,
    pub sort_order: Option<i32>,
    /// Geo-zone restriction; zero or less means none
    pub zone_id: i64,
}

impl ModuleSettings {
    /// Build settings from raw store values
    pub fn from_values(
        status: Option<&str>,
        sort_order: Option<&str>,
        zone: Option<&str>,
    ) -> Self {
        Self {
            enabled: status.map(|s| s.trim() == "True").unwrap_or(false),
            sort_order: sort_order.and_then(|s| s.trim().parse().ok()),
            zone_id: zone.and_then(|s| s.trim().parse().ok()).unwrap_or(0),
        }
    }

    /// Read the settings once for the current evaluation
    pub async fn load(store: &dyn ConfigurationStore) -> Result<Self, DatabaseError> {
        let status = store.get(KEY_STATUS).await?;
        let sort_order = store.get(KEY_SORT_ORDER).await?;
        let zone = store.get(KEY_ZONE).await?;

        Ok(Self::from_values(
            status.as_deref(),
            sort_order.as_deref(),
            zone.as_deref(),
        ))
    }

    pub fn has_zone_restriction(&self) -> bool {
        self.zone_id > 0
    }
}

/// Test-mode API key entered by the administrator, if any
pub async fn stored_test_key(
    store: &dyn ConfigurationStore,
) -> Result<Option<String>, DatabaseError> {
    Ok(store
        .get(KEY_API_KEY_TEST)
        .await?
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty()))
}
