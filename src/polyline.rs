//! Route geometry for the map renderer.
//!
//! Points are kept decoded; encoding into a compact wire format belongs to
//! whoever draws the map.

use serde::{Deserialize, Serialize};

use crate::haversine::haversine_km;

/// A polyline representing a route geometry as decoded coordinates.
///
/// Each point is a (latitude, longitude) tuple, in drawing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }

    /// Consecutive point pairs, one per drawn segment.
    pub fn segments(&self) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Great-circle length of the whole line.
    pub fn length_km(&self) -> f64 {
        self.segments().map(|(from, to)| haversine_km(from, to)).sum()
    }
}
