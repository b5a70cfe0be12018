use thiserror::Error;

/// Errors raised while planning delivery routes.
///
/// Every variant is scoped to a single stop or vehicle; the planner records
/// it next to the affected entity and carries on with the rest.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    /// A stop's latitude/longitude is missing, non-finite or out of range.
    ///
    /// The stop is excluded from its vehicle's node set.
    #[error("invalid coordinate (latitude: {latitude:?}, longitude: {longitude:?})")]
    InvalidCoordinate {
        latitude: Option<f64>,
        longitude: Option<f64>,
    },

    /// Nothing to route besides the depot.
    #[error("no routable stops besides the depot")]
    EmptyNodeSet,

    /// A tour does not correspond 1:1 to the node set used to build it.
    #[error("tour does not match its node set: {0}")]
    DataConsistencyFault(String),

    /// The planner configuration was rejected.
    #[error("invalid planner configuration: {0}")]
    InvalidConfig(String),
}
