//! Single-vehicle tour solver.
//!
//! Builds a closed tour (depot -> stops -> depot) with cheapest insertion,
//! then improves it with guided local search until the time budget runs out.
//! The search optimizes integer cost units; tours are compared on kilometers.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PlannerError;
use crate::matrix::{CostMatrix, DistanceMatrix};

/// Default wall-clock budget per vehicle.
const DEFAULT_TIME_LIMIT_SECS: f64 = 10.0;

/// Default scale of the penalty weight relative to the average edge cost.
const DEFAULT_PENALTY_FACTOR: f64 = 0.1;

/// Longest segment moved by Or-opt.
const MAX_OR_OPT_SEGMENT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    /// Wall-clock budget for one vehicle, in seconds.
    pub time_limit_secs: f64,
    /// Maximum guided local search rounds. `None` searches until the deadline.
    pub max_iterations: Option<usize>,
    /// Penalty weight as a fraction of the first local optimum's average edge cost.
    pub penalty_factor: f64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            max_iterations: None,
            penalty_factor: DEFAULT_PENALTY_FACTOR,
        }
    }
}

impl SolveOptions {
    pub fn time_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_limit_secs).unwrap_or(if self.time_limit_secs > 0.0 {
            Duration::MAX
        } else {
            Duration::ZERO
        })
    }
}

/// A closed visiting sequence over node indices, starting and ending at the depot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tour {
    nodes: Vec<usize>,
}

impl Tour {
    /// Validate a node sequence for a node set of `node_count` nodes.
    ///
    /// The sequence must have `node_count + 1` entries, start and end at 0,
    /// and visit every other node exactly once.
    pub fn new(nodes: Vec<usize>, node_count: usize) -> Result<Self, PlannerError> {
        if node_count < 2 {
            return Err(PlannerError::EmptyNodeSet);
        }
        if nodes.len() != node_count + 1 {
            return Err(PlannerError::DataConsistencyFault(format!(
                "tour has {} entries, expected {}",
                nodes.len(),
                node_count + 1
            )));
        }
        if nodes[0] != 0 || nodes[node_count] != 0 {
            return Err(PlannerError::DataConsistencyFault(
                "tour must start and end at the depot".to_string(),
            ));
        }

        let mut seen = vec![false; node_count];
        seen[0] = true;
        for &node in &nodes[1..node_count] {
            if node >= node_count || seen[node] {
                return Err(PlannerError::DataConsistencyFault(format!(
                    "node {} is out of range or repeated",
                    node
                )));
            }
            seen[node] = true;
        }

        Ok(Self { nodes })
    }

    /// The degraded `[0, 1, ..., n-1, 0]` tour over every node of `matrix`.
    ///
    /// A matrix always holds at least two nodes, so the tour is never empty.
    pub fn identity(matrix: &DistanceMatrix) -> Self {
        let mut nodes: Vec<usize> = (0..matrix.len()).collect();
        nodes.push(0);
        Self { nodes }
    }

    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// Stop nodes in visiting order (depot endpoints excluded).
    pub fn interior(&self) -> &[usize] {
        &self.nodes[1..self.nodes.len() - 1]
    }

    /// Number of distinct nodes, depot included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn length_km(&self, matrix: &DistanceMatrix) -> f64 {
        matrix.path_length_km(&self.nodes)
    }

    pub fn into_nodes(self) -> Vec<usize> {
        self.nodes
    }
}

/// Why a solve is flagged as degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    /// The deadline passed before anything beat the constructed tour.
    TimeLimitReached,
    /// Construction failed and the identity tour was used.
    ConstructionFallback,
}

/// Outcome of a solve. Every status comes with a valid tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Local search found a shorter tour than construction.
    Improved,
    /// The search ended on its own without beating construction.
    Converged,
    Degraded(DegradedReason),
}

impl SolveStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, SolveStatus::Degraded(_))
    }
}

#[derive(Debug, Clone)]
pub struct TourSolution {
    pub tour: Tour,
    pub status: SolveStatus,
    /// Length of the returned tour.
    pub distance_km: f64,
    /// Length of the tour right after construction.
    pub construction_km: f64,
    /// Completed guided local search rounds.
    pub rounds: usize,
    pub elapsed: Duration,
}

/// Run cheapest-insertion construction only.
///
/// Deterministic: ties go to the lowest node index, then the earliest
/// position, and the result is oriented so its first stop has a lower index
/// than its last.
pub fn construct(matrix: &DistanceMatrix) -> Result<Tour, PlannerError> {
    Tour::new(cheapest_insertion(&matrix.to_costs()), matrix.len())
}

/// Solve one vehicle's tour within `options.time_limit()`.
pub fn solve_tour(matrix: &DistanceMatrix, options: &SolveOptions) -> TourSolution {
    let started = Instant::now();
    let deadline = started.checked_add(options.time_limit());
    let node_count = matrix.len();
    let costs = matrix.to_costs();

    let initial = match Tour::new(cheapest_insertion(&costs), node_count) {
        Ok(tour) => tour,
        Err(err) => {
            warn!(nodes = node_count, error = %err, "construction failed, using identity tour");
            let tour = Tour::identity(matrix);
            let km = tour.length_km(matrix);
            return TourSolution {
                tour,
                status: SolveStatus::Degraded(DegradedReason::ConstructionFallback),
                distance_km: km,
                construction_km: km,
                rounds: 0,
                elapsed: started.elapsed(),
            };
        }
    };

    let construction_km = initial.length_km(matrix);
    debug!(nodes = node_count, km = construction_km, "constructed initial tour");

    // With three nodes or fewer every closed tour has the same length.
    if node_count <= 3 {
        return TourSolution {
            tour: initial,
            status: SolveStatus::Converged,
            distance_km: construction_km,
            construction_km,
            rounds: 0,
            elapsed: started.elapsed(),
        };
    }

    let mut incumbent = Incumbent {
        nodes: initial.nodes.clone(),
        km: construction_km,
    };
    let mut current = initial.into_nodes();
    let mut search = GuidedSearch::new(&costs, deadline);
    let mut rounds = 0;
    let mut timed_out = false;

    loop {
        if options.max_iterations.is_some_and(|max| rounds >= max) {
            break;
        }
        if !search.descend(&mut current, matrix, &mut incumbent) {
            timed_out = true;
            break;
        }
        rounds += 1;

        let cost = costs.path_cost(&current);
        if cost == 0 {
            break;
        }
        if search.lambda == 0 {
            let average_edge = cost as f64 / node_count as f64;
            search.lambda = (options.penalty_factor * average_edge).round().max(1.0) as i64;
        }
        search.penalize(&current);
    }

    let status = if incumbent.km < construction_km {
        SolveStatus::Improved
    } else if timed_out {
        SolveStatus::Degraded(DegradedReason::TimeLimitReached)
    } else {
        SolveStatus::Converged
    };

    debug!(
        nodes = node_count,
        construction_km,
        km = incumbent.km,
        rounds,
        ?status,
        "tour search finished"
    );

    TourSolution {
        tour: Tour {
            nodes: incumbent.nodes,
        },
        status,
        distance_km: incumbent.km,
        construction_km,
        rounds,
        elapsed: started.elapsed(),
    }
}

// ============================================================================
// Construction
// ============================================================================

fn cheapest_insertion(costs: &CostMatrix) -> Vec<usize> {
    let n = costs.len();
    let mut tour = vec![0, 0];
    let mut inserted = vec![false; n];
    if let Some(depot) = inserted.first_mut() {
        *depot = true;
    }

    for _ in 1..n {
        // (added cost, node, edge position)
        let mut best: Option<(i64, usize, usize)> = None;
        for node in 1..n {
            if inserted[node] {
                continue;
            }
            for position in 0..tour.len() - 1 {
                let (a, b) = (tour[position], tour[position + 1]);
                let delta = costs.get(a, node) + costs.get(node, b) - costs.get(a, b);
                if best.is_none_or(|(best_delta, _, _)| delta < best_delta) {
                    best = Some((delta, node, position));
                }
            }
        }

        let Some((_, node, position)) = best else {
            break;
        };
        tour.insert(position + 1, node);
        inserted[node] = true;
    }

    orient(&mut tour);
    tour
}

/// Mirror a closed tour so the first stop has a lower index than the last.
fn orient(tour: &mut [usize]) {
    let len = tour.len();
    if len >= 4 && tour[1] > tour[len - 2] {
        tour[1..len - 1].reverse();
    }
}

// ============================================================================
// Guided Local Search
// ============================================================================

/// Best tour seen so far, kept apart from the tour being searched.
struct Incumbent {
    nodes: Vec<usize>,
    km: f64,
}

impl Incumbent {
    fn offer(&mut self, candidate: &[usize], matrix: &DistanceMatrix) {
        let mut nodes = candidate.to_vec();
        orient(&mut nodes);
        let km = matrix.path_length_km(&nodes);
        if km < self.km {
            self.nodes = nodes;
            self.km = km;
        }
    }
}

enum Step {
    Improved,
    NoMove,
    Expired,
}

struct GuidedSearch<'a> {
    costs: &'a CostMatrix,
    penalties: Vec<u32>,
    lambda: i64,
    deadline: Option<Instant>,
}

impl<'a> GuidedSearch<'a> {
    fn new(costs: &'a CostMatrix, deadline: Option<Instant>) -> Self {
        Self {
            costs,
            penalties: vec![0; costs.len() * costs.len()],
            lambda: 0,
            deadline,
        }
    }

    fn expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn penalty(&self, a: usize, b: usize) -> u32 {
        self.penalties[a * self.costs.len() + b]
    }

    /// Edge cost plus its weighted penalty.
    fn augmented(&self, a: usize, b: usize) -> i64 {
        self.costs.get(a, b) + self.lambda * i64::from(self.penalty(a, b))
    }

    /// Apply improving moves until none is left.
    ///
    /// Returns false when the deadline interrupted the descent.
    fn descend(&self, tour: &mut Vec<usize>, matrix: &DistanceMatrix, incumbent: &mut Incumbent) -> bool {
        loop {
            let step = match self.two_opt(tour) {
                Step::NoMove => self.or_opt(tour),
                step => step,
            };
            match step {
                Step::Improved => incumbent.offer(tour, matrix),
                Step::NoMove => return true,
                Step::Expired => return false,
            }
        }
    }

    /// Reverse a segment when that removes the more expensive pair of edges.
    fn two_opt(&self, tour: &mut [usize]) -> Step {
        let edges = tour.len() - 1;

        for i in 0..edges - 2 {
            if self.expired() {
                return Step::Expired;
            }
            let (a, b) = (tour[i], tour[i + 1]);
            for j in i + 2..edges {
                let (c, d) = (tour[j], tour[j + 1]);
                let delta = self.augmented(a, c) + self.augmented(b, d)
                    - self.augmented(a, b)
                    - self.augmented(c, d);
                if delta < 0 {
                    tour[i + 1..=j].reverse();
                    return Step::Improved;
                }
            }
        }

        Step::NoMove
    }

    /// Move a short segment, possibly reversed, to a cheaper edge.
    fn or_opt(&self, tour: &mut Vec<usize>) -> Step {
        let edges = tour.len() - 1;

        for len in 1..=MAX_OR_OPT_SEGMENT {
            // A segment covering every stop has nowhere to go.
            if len >= edges - 1 {
                break;
            }
            for start in 1..=edges - len {
                if self.expired() {
                    return Step::Expired;
                }
                let end = start + len - 1;
                let (prev, first, last, next) = (tour[start - 1], tour[start], tour[end], tour[end + 1]);
                let removal_gain =
                    self.augmented(prev, first) + self.augmented(last, next) - self.augmented(prev, next);

                for k in 0..edges {
                    // Edges start-1..=end touch the segment.
                    if k + 1 >= start && k <= end {
                        continue;
                    }
                    let (x, y) = (tour[k], tour[k + 1]);
                    let base = self.augmented(x, y);

                    let forward = self.augmented(x, first) + self.augmented(last, y) - base;
                    if forward < removal_gain {
                        relocate(tour, start, len, k, false);
                        return Step::Improved;
                    }
                    if len > 1 {
                        let reversed = self.augmented(x, last) + self.augmented(first, y) - base;
                        if reversed < removal_gain {
                            relocate(tour, start, len, k, true);
                            return Step::Improved;
                        }
                    }
                }
            }
        }

        Step::NoMove
    }

    /// Penalize the tour edges with the highest `cost / (1 + penalty)`.
    fn penalize(&mut self, tour: &[usize]) {
        let utility = |a: usize, b: usize| self.costs.get(a, b) as f64 / (1.0 + f64::from(self.penalty(a, b)));

        let max_utility = tour
            .windows(2)
            .map(|edge| utility(edge[0], edge[1]))
            .fold(f64::MIN, f64::max);
        let selected: Vec<(usize, usize)> = tour
            .windows(2)
            .filter(|edge| utility(edge[0], edge[1]) == max_utility)
            .map(|edge| (edge[0], edge[1]))
            .collect();

        let size = self.costs.len();
        for (a, b) in selected {
            self.penalties[a * size + b] += 1;
            self.penalties[b * size + a] += 1;
        }
    }
}

/// Move `tour[start..start + len]` onto the edge that starts at position `k`.
fn relocate(tour: &mut Vec<usize>, start: usize, len: usize, k: usize, reversed: bool) {
    let mut segment: Vec<usize> = tour.drain(start..start + len).collect();
    if reversed {
        segment.reverse();
    }
    let at = if k < start { k + 1 } else { k + 1 - len };
    tour.splice(at..at, segment);
}
