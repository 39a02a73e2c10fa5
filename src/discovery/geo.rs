//! Great-circle distance on a spherical earth
//!
//! The same haversine formula exists twice: in Rust for callers that already
//! hold both points, and as a SQL expression used as the discovery sort key.

use crate::models::GeoPoint;

/// Mean earth radius in meters used by the spherical approximation
pub const EARTH_RADIUS_METERS: f64 = 6_370_986.0;

/// Surface distance in meters between two points
pub fn distance_meters(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// SQL expression computing the distance from a bound point to a row's point.
///
/// `table` is the alias holding `longitude`/`latitude` columns; `lon_param`
/// and `lat_param` are the positional placeholders of the reference point.
pub fn sql_distance(table: &str, lon_param: usize, lat_param: usize) -> String {
    format!(
        "(2 * {radius} * asin(least(1.0, sqrt(\
            power(sin(radians({t}.latitude - ${lat}::float8) / 2), 2) \
            + cos(radians(${lat}::float8)) * cos(radians({t}.latitude)) \
            * power(sin(radians({t}.longitude - ${lon}::float8) / 2), 2)))))",
        radius = EARTH_RADIUS_METERS,
        t = table,
        lat = lat_param,
        lon = lon_param,
    )
}
