//! Haversine (great-circle) distances and the matrix provider built on them.
//!
//! Straight-line distance ignores the road network but needs no external
//! service, and is what delivery ordering is optimized against.

use crate::error::PlannerError;
use crate::matrix::DistanceMatrix;
use crate::traits::DistanceMatrixProvider;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate haversine distance between two points in kilometers.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    // Absolute differences keep the result bit-identical in both directions.
    let delta_lat = (lat2 - lat1).abs().to_radians();
    let delta_lng = (lng2 - lng1).abs().to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Check that a location is present, finite and within geodetic ranges.
pub fn validate_location(location: Option<(f64, f64)>) -> Result<(f64, f64), PlannerError> {
    match location {
        Some((lat, lng))
            if lat.is_finite()
                && lng.is_finite()
                && (-90.0..=90.0).contains(&lat)
                && (-180.0..=180.0).contains(&lng) =>
        {
            Ok((lat, lng))
        }
        Some((lat, lng)) => Err(PlannerError::InvalidCoordinate {
            latitude: Some(lat),
            longitude: Some(lng),
        }),
        None => Err(PlannerError::InvalidCoordinate {
            latitude: None,
            longitude: None,
        }),
    }
}

/// Haversine-based distance matrix provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineMatrix;

impl DistanceMatrixProvider for HaversineMatrix {
    fn matrix_for(&self, locations: &[(f64, f64)]) -> Result<DistanceMatrix, PlannerError> {
        DistanceMatrix::from_fn(locations, haversine_km)
    }
}
