//! Turns solver output back into an ordered, numbered stop list.

use crate::error::PlannerError;
use crate::matrix::DistanceMatrix;
use crate::polyline::Polyline;
use crate::solver::{SolveStatus, Tour, TourSolution};
use crate::traits::Stop;

/// The depot plus one vehicle's routable stops, in matrix index order.
///
/// Node 0 is the depot and node `i` is `stops[i - 1]`. The matrix is built
/// from [`NodeSet::locations`], so stops are always looked up through here.
#[derive(Debug)]
pub struct NodeSet<'a, S: Stop> {
    depot: (f64, f64),
    stops: Vec<&'a S>,
    locations: Vec<(f64, f64)>,
}

impl<'a, S: Stop> NodeSet<'a, S> {
    /// Pair each stop with an already validated location.
    pub fn new(depot: (f64, f64), routable: Vec<(&'a S, (f64, f64))>) -> Self {
        let mut locations = Vec::with_capacity(routable.len() + 1);
        locations.push(depot);
        let mut stops = Vec::with_capacity(routable.len());
        for (stop, location) in routable {
            stops.push(stop);
            locations.push(location);
        }
        Self {
            depot,
            stops,
            locations,
        }
    }

    pub fn depot(&self) -> (f64, f64) {
        self.depot
    }

    /// Locations indexed by node; entry 0 is the depot.
    pub fn locations(&self) -> &[(f64, f64)] {
        &self.locations
    }

    /// Number of nodes, depot included.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Stop behind a node index. The depot and out-of-range nodes have none.
    pub fn stop(&self, node: usize) -> Option<&'a S> {
        node.checked_sub(1).and_then(|index| self.stops.get(index).copied())
    }

    pub fn stops(&self) -> &[&'a S] {
        &self.stops
    }
}

/// A stop placed on a vehicle's route.
#[derive(Debug)]
pub struct AssignedStop<'a, S: Stop> {
    /// 1-based position in the visiting order.
    pub visit_order: usize,
    pub stop: &'a S,
    pub location: (f64, f64),
    /// Distance from the previous stop (or the depot for the first one).
    pub leg_km: f64,
}

impl<S: Stop> AssignedStop<'_, S> {
    pub fn vehicle_key(&self) -> &S::VehicleKey {
        self.stop.vehicle_key()
    }
}

/// One leg between consecutive nodes of a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteLeg {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub distance_km: f64,
}

/// A solved and numbered route for one vehicle.
#[derive(Debug)]
pub struct VehicleRoute<'a, S: Stop> {
    pub depot: (f64, f64),
    pub stops: Vec<AssignedStop<'a, S>>,
    /// Every leg in order, including the return to the depot.
    pub legs: Vec<RouteLeg>,
    pub tour: Tour,
    pub status: SolveStatus,
    pub total_km: f64,
}

impl<S: Stop> VehicleRoute<'_, S> {
    /// Closed route geometry: depot, stops in visiting order, depot.
    pub fn polyline(&self) -> Polyline {
        let mut points = Vec::with_capacity(self.stops.len() + 2);
        points.push(self.depot);
        points.extend(self.stops.iter().map(|assigned| assigned.location));
        points.push(self.depot);
        Polyline::new(points)
    }
}

/// Number the stops of a solved tour and measure each leg.
///
/// Fails with `DataConsistencyFault` if the tour does not cover the node set
/// exactly once.
pub fn assemble<'a, S: Stop>(
    nodes: &NodeSet<'a, S>,
    matrix: &DistanceMatrix,
    solution: TourSolution,
) -> Result<VehicleRoute<'a, S>, PlannerError> {
    let tour = solution.tour;

    if matrix.len() != nodes.len() {
        return Err(PlannerError::DataConsistencyFault(format!(
            "matrix has {} nodes but the node set has {}",
            matrix.len(),
            nodes.len()
        )));
    }
    if tour.interior().len() != nodes.stops().len() {
        return Err(PlannerError::DataConsistencyFault(format!(
            "tour visits {} stops but {} were routed",
            tour.interior().len(),
            nodes.stops().len()
        )));
    }

    let mut stops = Vec::with_capacity(tour.interior().len());
    let mut legs = Vec::with_capacity(tour.nodes().len() - 1);
    let mut previous = 0;

    for &node in tour.interior() {
        let stop = nodes.stop(node).ok_or_else(|| {
            PlannerError::DataConsistencyFault(format!("tour node {} has no matching stop", node))
        })?;
        let location = nodes.locations()[node];
        let leg_km = matrix.get(previous, node);

        legs.push(RouteLeg {
            from: nodes.locations()[previous],
            to: location,
            distance_km: leg_km,
        });
        stops.push(AssignedStop {
            visit_order: stops.len() + 1,
            stop,
            location,
            leg_km,
        });
        previous = node;
    }

    legs.push(RouteLeg {
        from: nodes.locations()[previous],
        to: nodes.depot(),
        distance_km: matrix.get(previous, 0),
    });

    let total_km = legs.iter().map(|leg| leg.distance_km).sum();

    Ok(VehicleRoute {
        depot: nodes.depot(),
        stops,
        legs,
        tour,
        status: solution.status,
        total_km,
    })
}
