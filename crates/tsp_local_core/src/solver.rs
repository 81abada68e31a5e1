use crate::{
    DistanceMatrix, Point, construction, isolation,
    local_search::{self, SearchStats},
    options::SolverOptions,
    tour::{TourMetrics, validate_permutation},
};

/// Result of one solve. `tour` is a permutation of `0..points.len()`.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub tour: Vec<usize>,
    pub construction_length: f64,
    pub final_length: f64,
    pub isolated: usize,
    pub stats: SearchStats,
    pub metrics: TourMetrics,
}

/// Builds a closed tour over `points`: cheapest insertion with isolated
/// points deferred, then the configured local search.
#[tsp_local_derive::timer("solve")]
pub fn solve(points: &[Point], options: &SolverOptions) -> Solution {
    let n = points.len();
    log::info!(
        "solve: start n={n} refinement={} isolation_multiplier={}",
        options.refinement,
        options.isolation_multiplier
    );

    let matrix = DistanceMatrix::from_points(points);
    let classification = isolation::classify(&matrix, options.isolation_multiplier);
    let mut tour = construction::build_tour(&matrix, &classification);
    let construction_length = matrix.tour_length(&tour);

    let stats = local_search::refine(
        options.refinement,
        &matrix,
        &mut tour,
        &options.search_limits(),
    );
    debug_assert!(validate_permutation(&tour, n).is_ok());

    let final_length = matrix.tour_length(&tour);
    let metrics = TourMetrics::measure(&matrix, &tour, options.outlier_factor);

    log::info!(
        "solve: complete n={n} construction_length={construction_length:.4} final_length={final_length:.4} improvement={:.4} stop={}",
        construction_length - final_length,
        stats.stop
    );

    Solution {
        tour,
        construction_length,
        final_length,
        isolated: classification.isolated.len(),
        stats,
        metrics,
    }
}
