//! Vincenty's inverse formula on the WGS-84 ellipsoid.
//!
//! Iteratively solves for the longitude difference on the auxiliary sphere,
//! then applies the ellipsoidal series correction. Accurate to well under a
//! millimetre for all pairs that converge.
//!
//! Nearly antipodal pairs may converge slowly or not at all. That is a
//! property of the formula: the loop is capped and the last iterate is used.

use crate::{Coordinate, GeoError, Result};

/// WGS-84 semi-major axis in meters.
pub const WGS84_SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;

/// WGS-84 flattening.
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// WGS-84 semi-minor axis in meters, derived as `(1 - f) * a`.
pub const WGS84_SEMI_MINOR_AXIS_M: f64 = (1.0 - WGS84_FLATTENING) * WGS84_SEMI_MAJOR_AXIS_M;

/// Iteration budget used by [`vincenty_distance`].
pub const DEFAULT_MAX_ITERATIONS: i32 = 150;

/// Change in lambda (radians) below which the iteration has converged.
/// 1e-12 rad is roughly 0.06 mm on the ground.
pub const CONVERGENCE_THRESHOLD: f64 = 1e-12;

/// Calculates the ellipsoidal distance between two coordinates in kilometers,
/// using [`DEFAULT_MAX_ITERATIONS`].
///
/// # Example
/// ```
/// use geofence_geo::{vincenty_distance, Coordinate};
///
/// let dublin = Coordinate::new("Dublin", 53.339428, -6.257664).unwrap();
/// let dundalk = Coordinate::new("Dundalk", 53.997945, -6.405957).unwrap();
///
/// let distance = vincenty_distance(&dublin, &dundalk);
/// assert!((distance - 73.94).abs() < 0.01);
/// ```
pub fn vincenty_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();
    inverse(lat1, lon1, lat2, lon2, DEFAULT_MAX_ITERATIONS)
}

/// Calculates the ellipsoidal distance between two coordinates in kilometers
/// with an explicit iteration budget.
///
/// Running out of iterations is not an error; the last iterate is used.
/// A budget of zero evaluates the auxiliary sphere once at the raw longitude
/// difference and skips refinement.
///
/// # Errors
/// [`GeoError::InvalidArgument`] if `max_iterations` is negative.
pub fn vincenty_distance_with_iterations(
    from: &Coordinate,
    to: &Coordinate,
    max_iterations: i32,
) -> Result<f64> {
    if max_iterations < 0 {
        return Err(GeoError::InvalidArgument(format!(
            "number of iterations cannot be negative (got {})",
            max_iterations
        )));
    }

    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();
    Ok(inverse(lat1, lon1, lat2, lon2, max_iterations))
}

/// Per-point quantities on the auxiliary sphere.
#[derive(Debug, Clone, Copy)]
struct ReducedLatitude {
    sin: f64,
    cos: f64,
}

impl ReducedLatitude {
    #[inline]
    fn from_geodetic(phi: f64) -> Self {
        let u = ((1.0 - WGS84_FLATTENING) * phi.tan()).atan();
        Self {
            sin: u.sin(),
            cos: u.cos(),
        }
    }
}

/// Terms evaluated for one value of lambda.
#[derive(Debug, Clone, Copy)]
struct SphereTerms {
    sin_sigma: f64,
    cos_sigma: f64,
    sigma: f64,
    sin_alpha: f64,
    cos_sq_alpha: f64,
    cos_2sigma_m: f64,
}

impl SphereTerms {
    fn evaluate(lambda: f64, u1: ReducedLatitude, u2: ReducedLatitude) -> Self {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();

        let sin_sigma = ((u2.cos * sin_lambda).powi(2)
            + (u1.cos * u2.sin - u1.sin * u2.cos * cos_lambda).powi(2))
        .sqrt();
        let cos_sigma = u1.sin * u2.sin + u1.cos * u2.cos * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = u1.cos * u2.cos * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha.powi(2);

        // Both points on the equator: the geodesic runs along it.
        let cos_2sigma_m = if cos_sq_alpha == 0.0 {
            0.0
        } else {
            cos_sigma - 2.0 * u1.sin * u2.sin / cos_sq_alpha
        };

        Self {
            sin_sigma,
            cos_sigma,
            sigma,
            sin_alpha,
            cos_sq_alpha,
            cos_2sigma_m,
        }
    }

    fn next_lambda(&self, l: f64) -> f64 {
        let f = WGS84_FLATTENING;
        let c = f / 16.0 * self.cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * self.cos_sq_alpha));

        l + (1.0 - c)
            * f
            * self.sin_alpha
            * (self.sigma
                + c * self.sin_sigma
                    * (self.cos_2sigma_m
                        + c * self.cos_sigma * (-1.0 + 2.0 * self.cos_2sigma_m.powi(2))))
    }

    /// Geodesic length in meters.
    fn ellipsoidal_length(&self) -> f64 {
        let a2 = WGS84_SEMI_MAJOR_AXIS_M.powi(2);
        let b2 = WGS84_SEMI_MINOR_AXIS_M.powi(2);
        let u_sq = self.cos_sq_alpha * ((a2 - b2) / b2);

        let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
        let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));

        let cos_2sigma_m_sq = self.cos_2sigma_m.powi(2);
        let delta_sigma = b
            * self.sin_sigma
            * (self.cos_2sigma_m
                + 0.25
                    * b
                    * (self.cos_sigma * (-1.0 + 2.0 * cos_2sigma_m_sq)
                        - b / 6.0
                            * self.cos_2sigma_m
                            * (-3.0 + 4.0 * self.sin_sigma.powi(2))
                            * (-3.0 + 4.0 * cos_2sigma_m_sq)));

        WGS84_SEMI_MINOR_AXIS_M * a * (self.sigma - delta_sigma)
    }
}

/// Inverse problem on radians. Returns kilometers.
fn inverse(phi1: f64, lambda1: f64, phi2: f64, lambda2: f64, max_iterations: i32) -> f64 {
    if phi1 == phi2 && lambda1 == lambda2 {
        return 0.0;
    }

    let l = lambda2 - lambda1;
    let u1 = ReducedLatitude::from_geodetic(phi1);
    let u2 = ReducedLatitude::from_geodetic(phi2);

    let mut lambda = l;
    let mut terms = SphereTerms::evaluate(lambda, u1, u2);
    let mut converged = false;

    for _ in 0..max_iterations {
        terms = SphereTerms::evaluate(lambda, u1, u2);
        if terms.sin_sigma == 0.0 {
            // Distinct inputs that collapse to the same point (e.g. a pole).
            return 0.0;
        }

        let previous = lambda;
        lambda = terms.next_lambda(l);
        if (previous - lambda).abs() <= CONVERGENCE_THRESHOLD {
            converged = true;
            break;
        }
    }

    if terms.sin_sigma == 0.0 {
        return 0.0;
    }

    if !converged && max_iterations > 0 {
        tracing::debug!(
            max_iterations,
            lambda,
            "Vincenty iteration did not converge, using last iterate"
        );
    }

    terms.ellipsoidal_length() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use geographiclib_rs::{Geodesic, InverseGeodesic};
    use proptest::prelude::*;

    fn city(name: &str, lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(name, lat, lng).unwrap()
    }

    fn dublin() -> Coordinate {
        city("Dublin", 53.339428, -6.257664)
    }

    fn london() -> Coordinate {
        city("London", 51.509865, -0.118092)
    }

    fn dundalk() -> Coordinate {
        city("Dundalk", 53.997945, -6.405957)
    }

    fn sample_pairs() -> Vec<(Coordinate, Coordinate)> {
        vec![(dublin(), dundalk()), (london(), dublin()), (dundalk(), london())]
    }

    fn reference_km(from: &Coordinate, to: &Coordinate) -> f64 {
        let geod = Geodesic::wgs84();
        let meters: f64 = geod.inverse(from.latitude(), from.longitude(), to.latitude(), to.longitude());
        meters / 1000.0
    }

    #[test]
    fn test_semi_minor_axis() {
        assert!((WGS84_SEMI_MINOR_AXIS_M - 6_356_752.314_245).abs() < 1e-3);
    }

    #[test]
    fn test_dublin_to_london() {
        let distance = vincenty_distance(&dublin(), &london());
        assert!((distance - 464.419_482).abs() < 1e-5, "Dublin-London: {}", distance);
    }

    #[test]
    fn test_matches_reference_geodesic() {
        for (a, b) in sample_pairs() {
            let diff = (vincenty_distance(&a, &b) - reference_km(&a, &b)).abs();
            assert!(diff <= 1e-4, "{} -> {}: off by {} km", a.name(), b.name(), diff);
        }
    }

    #[test]
    fn test_long_haul_matches_reference() {
        let new_york = city("New York", 40.7128, -74.0060);
        let tokyo = city("Tokyo", 35.6762, 139.6503);
        let diff = (vincenty_distance(&new_york, &tokyo) - reference_km(&new_york, &tokyo)).abs();
        assert!(diff <= 1e-4, "NYC-Tokyo off by {} km", diff);
    }

    #[test]
    fn test_swapped_within_rounding() {
        for (a, b) in sample_pairs() {
            let diff = (vincenty_distance(&a, &b) - vincenty_distance(&b, &a)).abs();
            assert!(diff < 1e-11, "asymmetry {}", diff);
        }
    }

    #[test]
    fn test_same_point_is_exactly_zero() {
        for (a, b) in sample_pairs() {
            assert_eq!(vincenty_distance(&a, &a), 0.0);
            assert_eq!(vincenty_distance(&b, &b), 0.0);
        }
    }

    #[test]
    fn test_same_point_ignores_iteration_budget() {
        let a = dublin();
        for steps in [0, 1, 150, 10_000] {
            assert_eq!(
                vincenty_distance_with_iterations(&a, &a, steps).unwrap(),
                vincenty_distance(&a, &a)
            );
        }
    }

    #[test]
    fn test_negative_iterations_rejected() {
        let err = vincenty_distance_with_iterations(&london(), &dublin(), -10).unwrap_err();
        assert!(matches!(err, GeoError::InvalidArgument(_)));

        let err = vincenty_distance_with_iterations(&dublin(), &dublin(), -1).unwrap_err();
        assert!(matches!(err, GeoError::InvalidArgument(_)));
    }

    #[test]
    fn test_zero_iterations_is_finite() {
        let distance = vincenty_distance_with_iterations(&dundalk(), &london(), 0).unwrap();
        assert!(distance.is_finite());
        assert!(distance > 0.0);
    }

    #[test]
    fn test_converges_within_a_few_iterations() {
        let ten = vincenty_distance_with_iterations(&dublin(), &london(), 10).unwrap();
        assert_eq!(ten, vincenty_distance(&dublin(), &london()));

        let one = vincenty_distance_with_iterations(&dublin(), &london(), 1).unwrap();
        assert!((one - ten).abs() > 0.1);
    }

    #[test]
    fn test_equatorial_line() {
        let a = city("A", 0.0, 0.0);
        let b = city("B", 0.0, 1.0);
        let distance = vincenty_distance(&a, &b);
        // Along the equator the geodesic length is a * dlon
        let expected = WGS84_SEMI_MAJOR_AXIS_M * 1f64.to_radians() / 1000.0;
        assert!((distance - expected).abs() < 1e-6, "{} vs {}", distance, expected);
    }

    #[test]
    fn test_pole_with_different_longitudes() {
        let a = city("North", 90.0, 0.0);
        let b = city("North", 90.0, 180.0);
        let distance = vincenty_distance(&a, &b);
        assert!(distance.is_finite());
        assert!(distance < 1e-6, "{}", distance);
    }

    #[test]
    fn test_near_antipodal_returns_best_effort() {
        let a = city("A", 0.0, 0.0);
        let b = city("B", 0.5, 179.7);
        let distance = vincenty_distance(&a, &b);
        assert!(distance.is_finite());
        assert!(distance > 19_900.0 && distance < 20_010.0, "{}", distance);
    }

    proptest! {
        #[test]
        fn prop_self_distance_zero(lat in -90.0f64..=90.0, lng in -180.0f64..=180.0) {
            let p = city("p", lat, lng);
            prop_assert_eq!(vincenty_distance(&p, &p), 0.0);
        }

        #[test]
        fn prop_near_symmetric(
            lat1 in -90.0f64..=90.0, lng1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0, lng2 in -180.0f64..=180.0,
        ) {
            // Skip pairs within about a degree of antipodal, where the loop may not converge.
            let dlng = (lng2 - lng1).abs();
            let dlng = dlng.min(360.0 - dlng);
            prop_assume!((lat1 + lat2).abs() > 1.0 || dlng < 179.0);

            let p = city("p", lat1, lng1);
            let q = city("q", lat2, lng2);
            let diff = (vincenty_distance(&p, &q) - vincenty_distance(&q, &p)).abs();
            prop_assert!(diff < 1e-11, "asymmetry {}", diff);
        }
    }
}
