//! Flat rows for the route report exporter.

use serde::Serialize;

use crate::planner::PlannerResult;
use crate::traits::Stop;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow<K, Id> {
    pub vehicle_key: K,
    pub order: usize,
    pub stop_id: Id,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One row per routed stop, by vehicle and then by visit order.
///
/// Vehicles without a route contribute no rows.
pub fn report_rows<S: Stop>(result: &PlannerResult<'_, S>) -> Vec<ReportRow<S::VehicleKey, S::Id>> {
    result
        .routes()
        .flat_map(|(vehicle_key, route)| {
            route.stops.iter().map(move |assigned| ReportRow {
                vehicle_key: vehicle_key.clone(),
                order: assigned.visit_order,
                stop_id: assigned.stop.id().clone(),
                name: assigned.stop.name().to_string(),
                latitude: assigned.location.0,
                longitude: assigned.location.1,
            })
        })
        .collect()
}
