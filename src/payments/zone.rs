//! Geo-zone restriction matching

use crate::database::repository::GeoZoneEntry;

/// Decide whether a billing location falls inside the configured geo-zone.
///
/// A `configured_geo_zone_id` of zero or less means no restriction. Otherwise
/// the entries of that geo-zone for the billing country are scanned in
/// ascending zone order; an entry without a zone id covers the whole country.
pub fn matches(
    configured_geo_zone_id: i64,
    billing_country_id: i64,
    billing_zone_id: i64,
    geo_zone_entries: &[GeoZoneEntry],
) -> bool {
    if configured_geo_zone_id <= 0 {
        return true;
    }

    let mut candidates: Vec<&GeoZoneEntry> = geo_zone_entries
        .iter()
        .filter(|entry| {
            entry.geo_zone_id == configured_geo_zone_id && entry.country_id == billing_country_id
        })
        .collect();
    candidates.sort_by_key(|entry| entry.zone_id);

    candidates
        .into_iter()
        .any(|entry| entry.zone_id.map_or(true, |zone_id| zone_id == billing_zone_id))
}
