use crate::database::error::DatabaseError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A configuration row as installed by the administrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationEntry {
    pub key: String,
    pub value: String,
    pub title: String,
    pub description: String,
    pub group_id: i32,
    pub sort_order: i32,
}

/// One row of a geo-zone definition.
///
/// `zone_id == None` means every zone of `country_id` belongs to the geo-zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoZoneEntry {
    pub geo_zone_id: i64,
    pub country_id: i64,
    pub zone_id: Option<i64>,
}

/// Append-only order history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStatusRecord {
    pub order_id: i64,
    pub status_id: i32,
    pub comment: String,
    /// `-1` marks entries the shopper was never notified about
    pub customer_notified: i32,
    pub created_at: DateTime<Utc>,
}

/// String key/value store holding the module settings
#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    /// Read a single value
    async fn get(&self, key: &str) -> Result<Option<String>, DatabaseError>;

    /// Check whether a key has been installed
    async fn exists(&self, key: &str) -> Result<bool, DatabaseError> {
        Ok(self.get(key).await?.is_some())
    }

    /// Insert the given rows
    async fn install_defaults(&self, entries: &[ConfigurationEntry]) -> Result<(), DatabaseError>;

    /// Delete every listed key, returning how many rows went away
    async fn remove_all(&self, keys: &[String]) -> Result<u64, DatabaseError>;
}

/// Read access to geo-zone definitions
#[async_trait]
pub trait GeoZoneRepository: Send + Sync {
    /// Entries of `geo_zone_id` for `country_id`, ordered by zone id
    async fn entries(
        &self,
        geo_zone_id: i64,
        country_id: i64,
    ) -> Result<Vec<GeoZoneEntry>, DatabaseError>;
}

/// Write access to the order status history
#[async_trait]
pub trait OrderHistoryRepository: Send + Sync {
    async fn append(&self, record: &OrderStatusRecord) -> Result<(), DatabaseError>;
}
