//! Route planning across vehicle groups.
//!
//! Stops are grouped by vehicle key in first-seen order. Each group is
//! filtered, solved and assembled independently and in parallel; a failure
//! in one group never touches another.

use std::collections::HashMap;
use std::fmt::{self, Debug};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::{PlannerConfig, RevenuePolicy};
use crate::error::PlannerError;
use crate::haversine::{HaversineMatrix, validate_location};
use crate::palette::VehiclePalette;
use crate::route::{NodeSet, VehicleRoute, assemble};
use crate::solver::solve_tour;
use crate::summary::{FleetSummary, summarize};
use crate::traits::{DistanceMatrixProvider, Stop};

/// A stop left out of routing, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedStop<Id> {
    pub stop_id: Id,
    pub reason: PlannerError,
}

/// Planning outcome for one vehicle.
pub struct VehiclePlan<'a, S: Stop> {
    pub vehicle_key: S::VehicleKey,
    /// Stops dropped before matrix construction.
    pub excluded: Vec<ExcludedStop<S::Id>>,
    /// `EmptyNodeSet` when nothing was routable; `DataConsistencyFault` if
    /// assembly failed.
    pub route: Result<VehicleRoute<'a, S>, PlannerError>,
}

pub struct PlannerResult<'a, S: Stop> {
    /// One plan per vehicle, in first-seen order.
    pub vehicles: Vec<VehiclePlan<'a, S>>,
    pub summary: FleetSummary<S::VehicleKey>,
    pub palette: VehiclePalette<S::VehicleKey>,
}

// Written by hand: a derive would not bound `S::Id`.
impl<S> Debug for VehiclePlan<'_, S>
where
    S: Stop + Debug,
    S::Id: Debug,
    S::VehicleKey: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VehiclePlan")
            .field("vehicle_key", &self.vehicle_key)
            .field("excluded", &self.excluded)
            .field("route", &self.route)
            .finish()
    }
}

impl<S> Debug for PlannerResult<'_, S>
where
    S: Stop + Debug,
    S::Id: Debug,
    S::VehicleKey: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlannerResult")
            .field("vehicles", &self.vehicles)
            .field("summary", &self.summary)
            .field("palette", &self.palette)
            .finish()
    }
}

impl<'a, S: Stop> PlannerResult<'a, S> {
    pub fn vehicle(&self, key: &S::VehicleKey) -> Option<&VehiclePlan<'a, S>> {
        self.vehicles.iter().find(|plan| &plan.vehicle_key == key)
    }

    /// Successfully routed vehicles.
    pub fn routes(&self) -> impl Iterator<Item = (&S::VehicleKey, &VehicleRoute<'a, S>)> + '_ {
        self.vehicles
            .iter()
            .filter_map(|plan| plan.route.as_ref().ok().map(|route| (&plan.vehicle_key, route)))
    }
}

/// Plan routes with great-circle distances.
pub fn plan_routes_with_haversine<'a, S>(
    stops: &'a [S],
    config: &PlannerConfig,
) -> Result<PlannerResult<'a, S>, PlannerError>
where
    S: Stop + Sync,
    S::Id: Debug + Send + Sync,
    S::VehicleKey: Debug + Send + Sync,
{
    plan_routes(stops, config, &HaversineMatrix)
}

/// Plan one route per vehicle group and summarize the fleet.
///
/// Only an invalid configuration fails the whole run; everything else is
/// reported per vehicle.
pub fn plan_routes<'a, S, M>(
    stops: &'a [S],
    config: &PlannerConfig,
    matrix_provider: &M,
) -> Result<PlannerResult<'a, S>, PlannerError>
where
    S: Stop + Sync,
    S::Id: Debug + Send + Sync,
    S::VehicleKey: Debug + Send + Sync,
    M: DistanceMatrixProvider + Sync,
{
    config.validate()?;

    let groups = group_by_vehicle(stops);
    info!(stops = stops.len(), vehicles = groups.len(), "planning routes");

    let palette = VehiclePalette::from_keys(groups.iter().map(|(key, _)| *key));

    let vehicles: Vec<VehiclePlan<'a, S>> = groups
        .into_par_iter()
        .map(|(key, members)| plan_vehicle(key, members, config, matrix_provider))
        .collect();

    let summary = match config.revenue_policy {
        RevenuePolicy::IncludeUnrouted => summarize(stops, config.vehicle_capacity),
        RevenuePolicy::RoutedOnly => summarize(
            vehicles
                .iter()
                .filter_map(|plan| plan.route.as_ref().ok())
                .flat_map(|route| route.stops.iter().map(|assigned| assigned.stop)),
            config.vehicle_capacity,
        ),
    };

    info!(
        routed = vehicles.iter().filter(|plan| plan.route.is_ok()).count(),
        total_revenue = summary.total_revenue,
        total_stops = summary.total_stops,
        "planning finished"
    );

    Ok(PlannerResult {
        vehicles,
        summary,
        palette,
    })
}

fn group_by_vehicle<S: Stop>(stops: &[S]) -> Vec<(&S::VehicleKey, Vec<&S>)> {
    let mut index: HashMap<&S::VehicleKey, usize> = HashMap::new();
    let mut groups: Vec<(&S::VehicleKey, Vec<&S>)> = Vec::new();

    for stop in stops {
        let key = stop.vehicle_key();
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(stop);
    }

    groups
}

fn plan_vehicle<'a, S, M>(
    key: &S::VehicleKey,
    members: Vec<&'a S>,
    config: &PlannerConfig,
    matrix_provider: &M,
) -> VehiclePlan<'a, S>
where
    S: Stop,
    S::Id: Debug,
    S::VehicleKey: Debug,
    M: DistanceMatrixProvider,
{
    let mut excluded = Vec::new();
    let mut routable = Vec::with_capacity(members.len());

    for stop in members {
        match validate_location(stop.location()) {
            Ok(location) => routable.push((stop, location)),
            Err(reason) => {
                warn!(vehicle = ?key, stop = ?stop.id(), error = %reason, "excluding stop from routing");
                excluded.push(ExcludedStop {
                    stop_id: stop.id().clone(),
                    reason,
                });
            }
        }
    }

    let nodes = NodeSet::new(config.depot, routable);
    let route = route_nodes(&nodes, config, matrix_provider);

    match &route {
        Ok(route) => {
            info!(
                vehicle = ?key,
                stops = route.stops.len(),
                km = route.total_km,
                status = ?route.status,
                "vehicle routed"
            );
            if route.status.is_degraded() {
                warn!(vehicle = ?key, status = ?route.status, "route is degraded");
            }
        }
        Err(PlannerError::EmptyNodeSet) => {
            warn!(vehicle = ?key, excluded = excluded.len(), "no routable stops, skipping vehicle");
        }
        Err(err) => {
            warn!(vehicle = ?key, error = %err, "route generation failed");
        }
    }

    VehiclePlan {
        vehicle_key: key.clone(),
        excluded,
        route,
    }
}

fn route_nodes<'a, S, M>(
    nodes: &NodeSet<'a, S>,
    config: &PlannerConfig,
    matrix_provider: &M,
) -> Result<VehicleRoute<'a, S>, PlannerError>
where
    S: Stop,
    M: DistanceMatrixProvider,
{
    if nodes.is_empty() {
        return Err(PlannerError::EmptyNodeSet);
    }
    let matrix = matrix_provider.matrix_for(nodes.locations())?;
    if matrix.len() != nodes.len() {
        return Err(PlannerError::DataConsistencyFault(format!(
            "provider returned a {0}x{0} matrix for {1} nodes",
            matrix.len(),
            nodes.len()
        )));
    }
    let solution = solve_tour(&matrix, &config.solve);
    assemble(nodes, &matrix, solution)
}
