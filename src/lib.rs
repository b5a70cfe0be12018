//! delivery-planner core
//!
//! Orders each vehicle's delivery stops into a short closed tour from a fixed
//! depot, and summarizes revenue per vehicle. Ingestion, map rendering and
//! report writing live outside this crate.

pub mod config;
pub mod error;
pub mod export;
pub mod haversine;
pub mod matrix;
pub mod palette;
pub mod planner;
pub mod polyline;
pub mod record;
pub mod route;
pub mod solver;
pub mod summary;
pub mod traits;

pub use config::{PlannerConfig, RevenuePolicy};
pub use error::PlannerError;
pub use planner::{PlannerResult, VehiclePlan, plan_routes, plan_routes_with_haversine};
pub use solver::{SolveOptions, SolveStatus, Tour};
