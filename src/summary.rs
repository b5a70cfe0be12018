//! Per-vehicle and fleet-wide revenue summaries.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::traits::Stop;

/// Default per-vehicle capacity, in currency units.
pub const DEFAULT_VEHICLE_CAPACITY: f64 = 8000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSummary<K> {
    pub vehicle_key: K,
    pub total_revenue: f64,
    /// Distinct stop identifiers served by this vehicle.
    pub stop_count: usize,
    /// Revenue as a percentage of vehicle capacity.
    pub utilization_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSummary<K> {
    /// One entry per vehicle, in first-seen order.
    pub vehicles: Vec<VehicleSummary<K>>,
    pub total_revenue: f64,
    /// Distinct stop identifiers across all vehicles.
    pub total_stops: usize,
}

impl<K: PartialEq> FleetSummary<K> {
    pub fn vehicle(&self, key: &K) -> Option<&VehicleSummary<K>> {
        self.vehicles.iter().find(|summary| &summary.vehicle_key == key)
    }
}

struct Tally<'a, Id> {
    revenue: f64,
    ids: HashSet<&'a Id>,
}

/// Summarize revenue, stop counts and utilization per vehicle.
pub fn summarize<'a, S, I>(stops: I, capacity: f64) -> FleetSummary<S::VehicleKey>
where
    S: Stop + 'a,
    I: IntoIterator<Item = &'a S>,
{
    let mut order: Vec<&S::VehicleKey> = Vec::new();
    let mut tallies: HashMap<&S::VehicleKey, Tally<'a, S::Id>> = HashMap::new();
    let mut all_ids: HashSet<&S::Id> = HashSet::new();

    for stop in stops {
        let key = stop.vehicle_key();
        let tally = tallies.entry(key).or_insert_with(|| {
            order.push(key);
            Tally {
                revenue: 0.0,
                ids: HashSet::new(),
            }
        });
        tally.revenue += stop.revenue();
        tally.ids.insert(stop.id());
        all_ids.insert(stop.id());
    }

    let vehicles: Vec<VehicleSummary<S::VehicleKey>> = order
        .into_iter()
        .filter_map(|key| {
            let tally = tallies.get(key)?;
            Some(VehicleSummary {
                vehicle_key: key.clone(),
                total_revenue: tally.revenue,
                stop_count: tally.ids.len(),
                utilization_pct: utilization_pct(tally.revenue, capacity),
            })
        })
        .collect();

    FleetSummary {
        total_revenue: vehicles.iter().map(|summary| summary.total_revenue).sum(),
        total_stops: all_ids.len(),
        vehicles,
    }
}

/// Revenue as a percentage of `capacity`; zero when capacity is not positive.
pub fn utilization_pct(revenue: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        revenue / capacity * 100.0
    } else {
        0.0
    }
}
