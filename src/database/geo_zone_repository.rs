use crate::database::error::DatabaseError;
use crate::database::repository::{GeoZoneEntry, GeoZoneRepository};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

#[derive(Debug, FromRow)]
struct ZoneToGeoZoneRow {
    geo_zone_id: i64,
    zone_country_id: i64,
    zone_id: Option<i64>,
}

impl From<ZoneToGeoZoneRow> for GeoZoneEntry {
    fn from(row: ZoneToGeoZoneRow) -> Self {
        Self {
            geo_zone_id: row.geo_zone_id,
            country_id: row.zone_country_id,
            zone_id: row.zone_id,
        }
    }
}

/// Geo-zone lookups against the `zones_to_geo_zones` table
pub struct PgGeoZoneRepository {
    pool: PgPool,
}

impl PgGeoZoneRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GeoZoneRepository for PgGeoZoneRepository {
    async fn entries(
        &self,
        geo_zone_id: i64,
        country_id: i64,
    ) -> Result<Vec<GeoZoneEntry>, DatabaseError> {
        let rows = sqlx::query_as::<_, ZoneToGeoZoneRow>(
            "SELECT geo_zone_id::BIGINT AS geo_zone_id, zone_country_id::BIGINT AS zone_country_id, zone_id::BIGINT AS zone_id
             FROM zones_to_geo_zones
             WHERE geo_zone_id = $1 AND zone_country_id = $2
             ORDER BY zone_id NULLS FIRST",
        )
        .bind(geo_zone_id)
        .bind(country_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(rows.into_iter().map(GeoZoneEntry::from).collect())
    }
}
