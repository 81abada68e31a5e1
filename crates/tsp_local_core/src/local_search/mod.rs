//! Edge-exchange refinement of a complete tour.
//!
//! Both neighbourhoods mutate the tour in place and stop at a local optimum,
//! or earlier when a [`SearchLimits`] bound is hit. A stopped search always
//! leaves a valid permutation that is no longer than the one it was given.

use std::{
    fmt,
    time::{Duration, Instant},
};

use tsp_local_derive::CliValue;

use crate::DistanceMatrix;

pub mod three_opt;
pub mod two_opt;

/// Below this size every cyclic order of the nodes has the same length.
pub(crate) const MIN_TOUR_SIZE_FOR_OPT: usize = 4;

pub const DEFAULT_IMPROVEMENT_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "refinement")]
pub enum Refinement {
    #[cli(alias = "2opt", alias = "2-opt")]
    TwoOpt,
    #[cli(alias = "3opt", alias = "3-opt")]
    ThreeOpt,
    /// Keep the constructed tour as-is.
    #[cli(name = "none")]
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchLimits {
    /// Caps 2-opt sweeps or applied 3-opt moves.
    pub max_iterations: Option<usize>,
    /// Checked between sweeps / moves, never inside one.
    pub time_limit: Option<Duration>,
    /// A move must shorten the tour by more than this to be applied.
    pub epsilon: f64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_iterations: None,
            time_limit: None,
            epsilon: DEFAULT_IMPROVEMENT_EPSILON,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StopReason {
    LocalOptimum,
    IterationLimit,
    TimeLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LocalOptimum => "local_optimum",
            Self::IterationLimit => "iteration_limit",
            Self::TimeLimit => "time_limit",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchStats {
    pub sweeps: usize,
    pub moves: usize,
    pub initial_length: f64,
    pub final_length: f64,
    pub stop: StopReason,
}

impl SearchStats {
    pub(crate) fn start(initial_length: f64) -> Self {
        Self {
            sweeps: 0,
            moves: 0,
            initial_length,
            final_length: initial_length,
            stop: StopReason::LocalOptimum,
        }
    }

    pub fn improvement(&self) -> f64 {
        self.initial_length - self.final_length
    }
}

/// Tracks the iteration cap and wall-clock deadline of one search.
pub(crate) struct Budget {
    started: Instant,
    limits: SearchLimits,
}

impl Budget {
    pub(crate) fn start(limits: &SearchLimits) -> Self {
        Self {
            started: Instant::now(),
            limits: *limits,
        }
    }

    pub(crate) fn exhausted(&self, iterations: usize) -> Option<StopReason> {
        if self
            .limits
            .max_iterations
            .is_some_and(|cap| iterations >= cap)
        {
            return Some(StopReason::IterationLimit);
        }
        if self
            .limits
            .time_limit
            .is_some_and(|limit| self.started.elapsed() >= limit)
        {
            return Some(StopReason::TimeLimit);
        }
        None
    }
}

/// Runs the chosen neighbourhood on `tour`.
pub fn refine(
    refinement: Refinement,
    matrix: &DistanceMatrix,
    tour: &mut [usize],
    limits: &SearchLimits,
) -> SearchStats {
    match refinement {
        Refinement::TwoOpt => two_opt::two_opt(matrix, tour, limits),
        Refinement::ThreeOpt => three_opt::three_opt(matrix, tour, limits),
        Refinement::Disabled => {
            log::debug!("local_search: skip reason=disabled");
            SearchStats::start(matrix.tour_length(tour))
        }
    }
}
