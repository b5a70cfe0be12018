//! End-to-end planner tests
//!
//! Grouping, coordinate filtering, per-vehicle failure isolation, revenue
//! policies and the reference scenarios.

mod fixtures;

use std::collections::HashSet;

use rstest::rstest;

use delivery_planner::export::report_rows;
use delivery_planner::matrix::DistanceMatrix;
use delivery_planner::record::StopRecord;
use delivery_planner::solver::SolveOptions;
use delivery_planner::summary::summarize;
use delivery_planner::traits::{DistanceMatrixProvider, Stop};
use delivery_planner::{
    PlannerConfig, PlannerError, PlannerResult, RevenuePolicy, plan_routes, plan_routes_with_haversine,
};

use fixtures::{CENTRAL, DEPOT, SOUTH, WEST, stops_for};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Treats degrees as plane coordinates (1 degree = 1 km).
struct FlatMatrix;

impl DistanceMatrixProvider for FlatMatrix {
    fn matrix_for(&self, locations: &[(f64, f64)]) -> Result<DistanceMatrix, PlannerError> {
        DistanceMatrix::from_fn(locations, |from, to| {
            ((from.0 - to.0).powi(2) + (from.1 - to.1).powi(2)).sqrt()
        })
    }
}

/// Drops the last node whenever asked for a four-node matrix.
struct TruncatingMatrix;

impl DistanceMatrixProvider for TruncatingMatrix {
    fn matrix_for(&self, locations: &[(f64, f64)]) -> Result<DistanceMatrix, PlannerError> {
        let used = if locations.len() == 4 {
            &locations[..3]
        } else {
            locations
        };
        FlatMatrix.matrix_for(used)
    }
}

fn quick_config() -> PlannerConfig {
    PlannerConfig {
        depot: DEPOT,
        solve: SolveOptions {
            max_iterations: Some(5),
            ..SolveOptions::default()
        },
        ..PlannerConfig::default()
    }
}

fn route_ids<'a>(result: &'a PlannerResult<'_, StopRecord>, vehicle: &str) -> Vec<&'a str> {
    result
        .vehicle(&vehicle.to_string())
        .and_then(|plan| plan.route.as_ref().ok())
        .map(|route| route.stops.iter().map(|a| a.stop.id.as_str()).collect())
        .unwrap_or_default()
}

// ============================================================================
// Reference Scenarios
// ============================================================================

#[test]
fn test_scenario_a_collinear_stops_visited_outward() {
    let stops = vec![
        StopRecord::new("A", "Stop A", 0.0, 1.0, 0.0, "truck"),
        StopRecord::new("B", "Stop B", 0.0, 2.0, 0.0, "truck"),
    ];
    let config = PlannerConfig {
        depot: (0.0, 0.0),
        ..quick_config()
    };

    let result = plan_routes(&stops, &config, &FlatMatrix).unwrap();

    assert_eq!(route_ids(&result, "truck"), vec!["A", "B"]);
    let route = result.routes().next().map(|(_, route)| route).unwrap();
    assert_eq!(route.tour.nodes(), &[0, 1, 2, 0]);
    assert!((route.total_km - 4.0).abs() < 1e-9);
}

#[rstest]
#[case::missing_longitude(Some(-3.74), None)]
#[case::missing_latitude(None, Some(-38.53))]
#[case::out_of_range(Some(-3.74), Some(-238.53))]
#[case::not_a_number(Some(f64::NAN), Some(-38.53))]
fn test_scenario_b_invalid_stop_is_excluded(#[case] latitude: Option<f64>, #[case] longitude: Option<f64>) {
    let mut broken = StopRecord::new("bad", "Sem Coordenada", 0.0, 0.0, 100.0, "joao");
    broken.latitude = latitude;
    broken.longitude = longitude;
    let stops = vec![CENTRAL[0].stop("good", 300.0, "joao"), broken];

    let result = plan_routes_with_haversine(&stops, &quick_config()).unwrap();
    let plan = result.vehicle(&"joao".to_string()).unwrap();

    assert_eq!(route_ids(&result, "joao"), vec!["good"]);
    assert_eq!(plan.excluded.len(), 1);
    assert_eq!(plan.excluded[0].stop_id, "bad");
    assert!(matches!(plan.excluded[0].reason, PlannerError::InvalidCoordinate { .. }));
    let route = plan.route.as_ref().unwrap();
    assert_eq!(route.tour.nodes(), &[0, 1, 0]);
}

#[test]
fn test_scenario_c_vehicle_without_valid_stops_is_skipped() {
    let mut first = StopRecord::new("x1", "Sem Coordenada 1", 0.0, 0.0, 200.0, "pedro");
    first.latitude = None;
    let mut second = StopRecord::new("x2", "Sem Coordenada 2", 0.0, 0.0, 100.0, "pedro");
    second.longitude = None;
    let mut stops = stops_for(&CENTRAL[..3], "c", "joao");
    stops.push(first);
    stops.push(second);

    let result = plan_routes_with_haversine(&stops, &quick_config()).unwrap();
    let pedro = result.vehicle(&"pedro".to_string()).unwrap();

    assert_eq!(pedro.route.as_ref().err(), Some(&PlannerError::EmptyNodeSet));
    assert_eq!(pedro.excluded.len(), 2);
    assert!(report_rows(&result).iter().all(|row| row.vehicle_key != "pedro"));
    assert_eq!(route_ids(&result, "joao").len(), 3, "other vehicles are unaffected");

    // Revenue of unroutable stops still counts by default.
    let summary = result.summary.vehicle(&"pedro".to_string()).unwrap();
    assert_eq!(summary.total_revenue, 300.0);
    assert_eq!(summary.stop_count, 2);
}

#[test]
fn test_scenario_d_utilization() {
    let stops = vec![
        CENTRAL[0].stop("1", 1000.0, "joao"),
        WEST[0].stop("2", 500.0, "maria"),
    ];

    let summary = summarize(&stops, 8000.0);

    assert_eq!(summary.vehicles[0].utilization_pct, 12.5);
    assert_eq!(summary.vehicles[1].utilization_pct, 6.25);
    assert_eq!(summary.total_revenue, 1500.0);
    assert_eq!(summary.total_stops, 2);
}

// ============================================================================
// Fleet Planning
// ============================================================================

#[test]
fn test_every_valid_stop_routed_once_per_vehicle() {
    let mut stops = stops_for(CENTRAL, "c", "joao");
    stops.extend(stops_for(WEST, "w", "maria"));
    stops.extend(stops_for(SOUTH, "s", "ana"));
    let config = PlannerConfig {
        solve: SolveOptions {
            time_limit_secs: 0.3,
            ..SolveOptions::default()
        },
        ..quick_config()
    };

    let result = plan_routes_with_haversine(&stops, &config).unwrap();

    assert_eq!(result.vehicles.len(), 3);
    for (key, route) in result.routes() {
        let expected: HashSet<&str> = stops
            .iter()
            .filter(|stop| stop.vehicle_key() == key)
            .map(|stop| stop.id.as_str())
            .collect();
        let routed: Vec<&str> = route.stops.iter().map(|a| a.stop.id.as_str()).collect();
        let orders: Vec<usize> = route.stops.iter().map(|a| a.visit_order).collect();

        assert_eq!(routed.len(), expected.len(), "{} visits each stop once", key);
        assert_eq!(routed.iter().copied().collect::<HashSet<_>>(), expected);
        assert_eq!(orders, (1..=expected.len()).collect::<Vec<_>>());
        assert_eq!(route.tour.nodes().len(), expected.len() + 2);
        assert_eq!(route.legs.len(), expected.len() + 1);
        assert_eq!(route.legs[0].from, DEPOT);
        assert!((route.total_km - route.polyline().length_km()).abs() < 1e-6);
    }
}

#[test]
fn test_vehicles_and_palette_follow_input_order() {
    let mut stops = stops_for(&SOUTH[..2], "s", "ana");
    stops.extend(stops_for(&CENTRAL[..2], "c", "joao"));
    stops.push(SOUTH[2].stop("s3", 250.0, "ana"));

    let result = plan_routes_with_haversine(&stops, &quick_config()).unwrap();

    let keys: Vec<&str> = result.vehicles.iter().map(|plan| plan.vehicle_key.as_str()).collect();
    assert_eq!(keys, vec!["ana", "joao"]);
    assert_eq!(result.palette.color_for(&"ana".to_string()), Some("red"));
    assert_eq!(result.palette.color_for(&"joao".to_string()), Some("blue"));
    assert_eq!(route_ids(&result, "ana").len(), 3);
}

#[test]
fn test_consistency_fault_is_scoped_to_one_vehicle() {
    let mut stops = stops_for(&CENTRAL[..3], "c", "joao");
    stops.extend(stops_for(&WEST[..2], "w", "maria"));

    let result = plan_routes(&stops, &quick_config(), &TruncatingMatrix).unwrap();

    let joao = result.vehicle(&"joao".to_string()).unwrap();
    assert!(matches!(joao.route, Err(PlannerError::DataConsistencyFault(_))));
    assert_eq!(route_ids(&result, "maria").len(), 2);
}

#[rstest]
#[case(RevenuePolicy::IncludeUnrouted, 450.0, 2)]
#[case(RevenuePolicy::RoutedOnly, 250.0, 1)]
fn test_revenue_policy(#[case] policy: RevenuePolicy, #[case] revenue: f64, #[case] stop_count: usize) {
    let mut unroutable = StopRecord::new("x", "Sem Coordenada", 0.0, 0.0, 200.0, "joao");
    unroutable.latitude = None;
    let stops = vec![CENTRAL[0].stop("c1", 250.0, "joao"), unroutable];
    let config = PlannerConfig {
        revenue_policy: policy,
        ..quick_config()
    };

    let result = plan_routes_with_haversine(&stops, &config).unwrap();

    let summary = result.summary.vehicle(&"joao".to_string()).unwrap();
    assert_eq!(summary.total_revenue, revenue);
    assert_eq!(summary.stop_count, stop_count);
    assert_eq!(result.summary.total_revenue, revenue);
}

#[test]
fn test_records_from_json_plan_end_to_end() {
    let stops = StopRecord::list_from_json(
        r#"[
            {"id": "101", "name": "Mercadinho Centro", "latitude": "-3.7275", "longitude": "-38.5270",
             "revenue": 1200, "vehicle_key": "JOAO"},
            {"id": "102", "name": "Padaria Aldeota", "latitude": -3.7390, "longitude": -38.4990,
             "revenue": "800.00", "vehicle_key": "JOAO"},
            {"id": "103", "name": "Sem Coordenada", "latitude": "", "longitude": "", "revenue": 400,
             "vehicle_key": "JOAO"}
        ]"#,
    )
    .unwrap();

    let result = plan_routes_with_haversine(&stops, &quick_config()).unwrap();

    assert_eq!(route_ids(&result, "JOAO").len(), 2);
    let summary = result.summary.vehicle(&"JOAO".to_string()).unwrap();
    assert_eq!(summary.total_revenue, 2400.0);
    assert!((summary.utilization_pct - 30.0).abs() < 1e-9);
}
