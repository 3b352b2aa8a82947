//! Great-circle distance between stations.

use super::station::{Location, Station};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two locations, in metres.
pub fn haversine_m(a: Location, b: Location) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Distance between two stations in metres, or `None` if either lacks
/// coordinates.
pub fn station_distance_m(a: &Station, b: &Station) -> Option<f64> {
    Some(haversine_m(a.location?, b.location?))
}

/// Convert metres to kilometres rounded to two decimals.
pub fn metres_to_km(metres: f64) -> f64 {
    (metres / 10.0).round() / 100.0
}

/// Distance between two stations in kilometres (two decimals).
pub fn station_distance_km(a: &Station, b: &Station) -> Option<f64> {
    station_distance_m(a, b).map(metres_to_km)
}
