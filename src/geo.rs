use itertools::Itertools;

use crate::data::LatLng;

pub const EARTH_RADIUS_KM: f64 = 6367.0;

/// Great-circle distance in kilometers.
pub fn haversine_km(from: &LatLng, to: &LatLng) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    // rounding can push the root just past 1.0
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Sum of the distances between consecutive points, in kilometers.
pub fn path_length_km(points: &[LatLng]) -> f64 {
    points
        .iter()
        .tuple_windows()
        .map(|(from, to)| haversine_km(from, to))
        .sum()
}
