//! Distance matrices over one vehicle's node set.
//!
//! Node 0 is always the depot; nodes 1..n are the vehicle's routable stops.

use crate::error::PlannerError;

/// Scale from kilometers to integer cost units (meters).
pub const COST_SCALE: f64 = 1000.0;

/// Square, symmetric matrix of distances in kilometers.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    km: Vec<f64>,
}

impl DistanceMatrix {
    /// Build a matrix by evaluating `distance` once per unordered pair.
    ///
    /// The lower triangle mirrors the upper one, so the result is exactly
    /// symmetric with a zero diagonal. Fails with `EmptyNodeSet` when there
    /// is nothing besides the depot.
    pub fn from_fn<F>(locations: &[(f64, f64)], distance: F) -> Result<Self, PlannerError>
    where
        F: Fn((f64, f64), (f64, f64)) -> f64,
    {
        let size = locations.len();
        if size < 2 {
            return Err(PlannerError::EmptyNodeSet);
        }

        let mut km = vec![0.0; size * size];
        for i in 0..size {
            for j in i + 1..size {
                let value = distance(locations[i], locations[j]).max(0.0);
                km[i * size + j] = value;
                km[j * size + i] = value;
            }
        }

        Ok(Self { size, km })
    }

    /// Number of nodes (depot included).
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Distance in kilometers between two nodes.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.km[from * self.size + to]
    }

    /// Total kilometers along a node sequence.
    pub fn path_length_km(&self, nodes: &[usize]) -> f64 {
        nodes.windows(2).map(|pair| self.get(pair[0], pair[1])).sum()
    }

    /// Integer view of the matrix used as the search objective.
    pub fn to_costs(&self) -> CostMatrix {
        CostMatrix {
            size: self.size,
            costs: self.km.iter().map(|km| (km * COST_SCALE) as i64).collect(),
        }
    }
}

/// Distances in integer cost units (meters, truncated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostMatrix {
    size: usize,
    costs: Vec<i64>,
}

impl CostMatrix {
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, from: usize, to: usize) -> i64 {
        self.costs[from * self.size + to]
    }

    pub fn path_cost(&self, nodes: &[usize]) -> i64 {
        nodes.windows(2).map(|pair| self.get(pair[0], pair[1])).sum()
    }
}
