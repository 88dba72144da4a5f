//! Haversine distance calculation.
//!
//! The Haversine formula calculates the great-circle distance between two points
//! on a sphere given their longitudes and latitudes. It is kept as a cheap
//! comparison baseline; radius filtering uses [`crate::vincenty_distance`].

use crate::Coordinate;

/// Earth's mean radius (IUGG) in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Earth's mean radius (IUGG) in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Calculates the great-circle distance between two coordinates in kilometers.
///
/// Treats the Earth as a sphere, so results can be off by up to ~0.5%
/// compared to the ellipsoidal distance.
///
/// # Example
/// ```
/// use geofence_geo::{haversine_distance, Coordinate};
///
/// let berlin = Coordinate::new("Berlin", 52.5200, 13.4050).unwrap();
/// let paris = Coordinate::new("Paris", 48.8566, 2.3522).unwrap();
///
/// let distance = haversine_distance(&berlin, &paris);
/// assert!((distance - 878.0).abs() < 10.0);
/// ```
#[inline]
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_KM)
}

/// Calculates the great-circle distance between two coordinates in meters.
#[inline]
pub fn haversine_distance_meters(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_M)
}

#[inline]
fn haversine_distance_with_radius(from: &Coordinate, to: &Coordinate, radius: f64) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    radius * c
}
