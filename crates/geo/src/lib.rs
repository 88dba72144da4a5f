//! Geodesic distance filtering for named locations.
//!
//! This crate provides:
//! - A validated [`Coordinate`] value type
//! - Vincenty distance on the WGS-84 ellipsoid (sub-millimetre convergence)
//! - Haversine distance as a cheaper spherical approximation
//! - A keyed [`LocationRegistry`] that can be trimmed to a radius
//! - Reading and writing the line-delimited customer record format
//!
//! # Example
//!
//! ```
//! use geofence_geo::{vincenty_distance, Coordinate};
//!
//! let dublin = Coordinate::new("Dublin", 53.339428, -6.257664).unwrap();
//! let london = Coordinate::new("London", 51.509865, -0.118092).unwrap();
//!
//! let distance_km = vincenty_distance(&dublin, &london);
//! assert!((distance_km - 464.4).abs() < 0.1);
//! ```

mod error;
mod haversine;
pub mod records;
mod registry;
mod vincenty;

pub use error::{GeoError, GeoErrorCode, Result};
pub use haversine::{haversine_distance, haversine_distance_meters, EARTH_RADIUS_KM, EARTH_RADIUS_M};
pub use records::{load_registry, read_registry, save_registry, write_registry, CustomerRecord};
pub use registry::LocationRegistry;
pub use vincenty::{
    vincenty_distance, vincenty_distance_with_iterations, CONVERGENCE_THRESHOLD,
    DEFAULT_MAX_ITERATIONS, WGS84_FLATTENING, WGS84_SEMI_MAJOR_AXIS_M, WGS84_SEMI_MINOR_AXIS_M,
};

/// A named geographic coordinate with latitude and longitude.
///
/// Values are validated on construction and cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Coordinate {
    name: String,
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    ///
    /// # Arguments
    /// * `name` - Human readable label
    /// * `latitude` - Latitude in degrees (-90 to 90, inclusive)
    /// * `longitude` - Longitude in degrees (-180 to 180, inclusive)
    ///
    /// # Errors
    /// [`GeoError::InvalidCoordinate`] when either value is out of range or not a number.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self> {
        // Written as negated comparisons so NaN is rejected too.
        if !(latitude.abs() <= 90.0) {
            return Err(GeoError::InvalidCoordinate(format!(
                "latitude {} is not in [-90, 90]",
                latitude
            )));
        }
        if !(longitude.abs() <= 180.0) {
            return Err(GeoError::InvalidCoordinate(format!(
                "longitude {} is not in [-180, 180]",
                longitude
            )));
        }

        Ok(Self {
            name: name.into(),
            latitude,
            longitude,
        })
    }

    /// Location label.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latitude in decimal degrees.
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(&self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl TryFrom<(&str, f64, f64)> for Coordinate {
    type Error = GeoError;

    fn try_from((name, lat, lng): (&str, f64, f64)) -> Result<Self> {
        Self::new(name, lat, lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_coordinate_creation() {
        let coord = Coordinate::new("Test", 53.339428, -6.257664).unwrap();
        assert_eq!(coord.name(), "Test");
        assert_eq!(coord.latitude(), 53.339428);
        assert_eq!(coord.longitude(), -6.257664);
    }

    #[test]
    fn test_coordinate_boundaries_are_valid() {
        for (lat, lng) in [(90.0, 180.0), (-90.0, -180.0), (90.0, -180.0), (-90.0, 180.0), (-1.0, 0.0)] {
            let coord = Coordinate::new("Test", lat, lng).unwrap();
            assert_eq!(coord.latitude(), lat);
            assert_eq!(coord.longitude(), lng);
        }
    }

    #[test]
    fn test_coordinate_out_of_range() {
        let cases = [
            (2000.0, 3.0),
            (78.0, 183.0),
            (180.0, 90.0),
            (90.000001, 180.0),
            (-90.0, -180.000001),
            (90.000001, -180.000001),
            (-90.000001, 180.000001),
        ];
        for (lat, lng) in cases {
            let err = Coordinate::new("Test", lat, lng).unwrap_err();
            assert_eq!(err.code(), GeoErrorCode::InvalidCoordinate, "({}, {})", lat, lng);
        }
    }

    #[test]
    fn test_coordinate_rejects_nan() {
        assert!(Coordinate::new("Test", f64::NAN, 0.0).is_err());
        assert!(Coordinate::new("Test", 0.0, f64::NAN).is_err());
        assert!(Coordinate::new("Test", f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn test_swapped_arguments_differ() {
        let a = Coordinate::new("Test", -1.0, 0.0).unwrap();
        let b = Coordinate::new("Test", 0.0, -1.0).unwrap();
        assert_eq!(a.name(), b.name());
        assert_ne!(a, b);
    }

    #[test]
    fn test_structural_equality() {
        let a = Coordinate::new("Dublin", 53.339428, -6.257664).unwrap();
        let b = Coordinate::new("Dublin", 53.339428, -6.257664).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Coordinate::new("Other", 53.339428, -6.257664).unwrap());
    }

    #[test]
    fn test_coordinate_try_from_tuple() {
        let coord: Coordinate = ("Berlin", 52.5200, 13.4050).try_into().unwrap();
        assert_eq!(coord.latitude(), 52.5200);
        assert!(Coordinate::try_from(("Nowhere", 91.0, 0.0)).is_err());
    }

    proptest! {
        #[test]
        fn prop_in_range_always_valid(lat in -90.0f64..=90.0, lng in -180.0f64..=180.0) {
            prop_assert!(Coordinate::new("p", lat, lng).is_ok());
        }

        #[test]
        fn prop_latitude_past_pole_rejected(eps in 1e-9f64..1000.0, lng in -180.0f64..=180.0) {
            prop_assert!(Coordinate::new("p", 90.0 + eps, lng).is_err());
            prop_assert!(Coordinate::new("p", -90.0 - eps, lng).is_err());
        }

        #[test]
        fn prop_longitude_past_antimeridian_rejected(eps in 1e-9f64..1000.0, lat in -90.0f64..=90.0) {
            prop_assert!(Coordinate::new("p", lat, 180.0 + eps).is_err());
            prop_assert!(Coordinate::new("p", lat, -180.0 - eps).is_err());
        }
    }
}
