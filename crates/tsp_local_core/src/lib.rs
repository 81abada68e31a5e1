//! Heuristic TSP solving on planar points: isolation-aware cheapest
//! insertion followed by 2-opt or 3-opt local search.

pub mod construction;
mod distance;
mod error;
mod io;
pub mod isolation;
pub mod local_search;
pub mod logging;
mod point;
mod solver;
pub mod tour;

pub(crate) use io::options;

pub use distance::DistanceMatrix;
pub use error::{Error, Result};
pub use io::input::{parse_points, read_points};
pub use io::options::{LogFormat, LogLevel, SolverOptions};
pub use io::output::{OutputTarget, derive_output_path, write_tour};
pub use isolation::Classification;
pub use local_search::{Refinement, SearchLimits, SearchStats, StopReason};
pub use point::Point;
pub use solver::{Solution, solve};
pub use tour::TourMetrics;
