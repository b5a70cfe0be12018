//! Planner configuration.

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::haversine::validate_location;
use crate::solver::SolveOptions;
use crate::summary::DEFAULT_VEHICLE_CAPACITY;

/// Distribution centre every route starts from and returns to.
pub const DEFAULT_DEPOT: (f64, f64) = (-3.7572635398641, -38.5854081195323);

/// Which stops count towards revenue and utilization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenuePolicy {
    /// Every stop counts, including ones excluded from routing for bad coordinates.
    #[default]
    IncludeUnrouted,
    /// Only stops that made it onto a route count.
    RoutedOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Depot (lat, lng).
    pub depot: (f64, f64),
    pub solve: SolveOptions,
    /// Capacity used for the utilization percentage, in currency units.
    pub vehicle_capacity: f64,
    pub revenue_policy: RevenuePolicy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            depot: DEFAULT_DEPOT,
            solve: SolveOptions::default(),
            vehicle_capacity: DEFAULT_VEHICLE_CAPACITY,
            revenue_policy: RevenuePolicy::default(),
        }
    }
}

impl PlannerConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, PlannerError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| PlannerError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PlannerError> {
        validate_location(Some(self.depot))
            .map_err(|err| PlannerError::InvalidConfig(format!("depot: {}", err)))?;

        if !(self.vehicle_capacity.is_finite() && self.vehicle_capacity > 0.0) {
            return Err(PlannerError::InvalidConfig(format!(
                "vehicle_capacity must be positive, got {}",
                self.vehicle_capacity
            )));
        }
        if !(self.solve.time_limit_secs.is_finite() && self.solve.time_limit_secs >= 0.0) {
            return Err(PlannerError::InvalidConfig(format!(
                "solve.time_limit_secs must be a non-negative number, got {}",
                self.solve.time_limit_secs
            )));
        }
        if !(self.solve.penalty_factor.is_finite() && self.solve.penalty_factor > 0.0) {
            return Err(PlannerError::InvalidConfig(format!(
                "solve.penalty_factor must be positive, got {}",
                self.solve.penalty_factor
            )));
        }

        Ok(())
    }
}
