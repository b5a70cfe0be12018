//! Core domain traits for the delivery planner.
//!
//! These are intentionally minimal. Ingestion code implements them for its
//! own records; [`crate::record::StopRecord`] is a ready-made implementation.

use std::hash::Hash;

use crate::error::PlannerError;
use crate::matrix::DistanceMatrix;

/// Unique identifier for planner entities.
pub trait Id: Clone + Eq + Hash {}

impl<T> Id for T where T: Clone + Eq + Hash {}

/// A delivery stop to be routed.
pub trait Stop {
    type Id: Id;
    type VehicleKey: Id;

    fn id(&self) -> &Self::Id;

    /// Display name.
    fn name(&self) -> &str;

    /// Location coordinates (lat, lng), if known.
    fn location(&self) -> Option<(f64, f64)>;

    /// Revenue carried by this stop. Missing amounts count as zero.
    fn revenue(&self) -> f64;

    /// Vehicle/driver group the stop was assigned to upstream.
    fn vehicle_key(&self) -> &Self::VehicleKey;
}

/// Provides a distance matrix (kilometers) for a set of locations.
///
/// The matrix is indexed by the provided location order; index 0 is the depot.
pub trait DistanceMatrixProvider {
    fn matrix_for(&self, locations: &[(f64, f64)]) -> Result<DistanceMatrix, PlannerError>;
}
