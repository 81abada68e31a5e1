use crate::{
    DistanceMatrix,
    local_search::{Budget, MIN_TOUR_SIZE_FOR_OPT, SearchLimits, SearchStats, StopReason},
};

/// Repeats full 2-opt sweeps until one applies no move.
#[tsp_local_derive::timer("two_opt")]
pub fn two_opt(matrix: &DistanceMatrix, tour: &mut [usize], limits: &SearchLimits) -> SearchStats {
    let n = tour.len();
    let mut stats = SearchStats::start(matrix.tour_length(tour));
    if n < MIN_TOUR_SIZE_FOR_OPT {
        log::debug!("two_opt: skip n={n} reason=insufficient_size");
        return stats;
    }

    log::info!(
        "two_opt: start n={n} length={:.4}",
        stats.initial_length
    );

    let budget = Budget::start(limits);
    loop {
        if let Some(reason) = budget.exhausted(stats.sweeps) {
            stats.stop = reason;
            break;
        }

        let swaps = sweep(matrix, tour, limits.epsilon);
        stats.sweeps += 1;
        stats.moves += swaps;
        log::debug!("two_opt: sweep={} swaps={swaps}", stats.sweeps);

        if swaps == 0 {
            stats.stop = StopReason::LocalOptimum;
            break;
        }
    }

    stats.final_length = matrix.tour_length(tour);
    log::info!(
        "two_opt: complete sweeps={} swaps={} length={:.4} stop={}",
        stats.sweeps,
        stats.moves,
        stats.final_length,
        stats.stop
    );
    stats
}

/// One pass over all non-adjacent edge pairs `(i, i+1)`, `(j, j+1)`.
/// Improving exchanges are applied immediately and the pass continues, since
/// reversing `i+1..=j` leaves every other position where it was.
pub(crate) fn sweep(matrix: &DistanceMatrix, tour: &mut [usize], epsilon: f64) -> usize {
    let n = tour.len();
    let mut swaps = 0usize;

    for i in 0..(n - 1) {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                // (t[n-1], t[0]) shares t[0] with (t[0], t[1]).
                continue;
            }
            if exchange_gain(matrix, tour, i, j) > epsilon {
                reverse_segment(tour, i + 1, j);
                swaps += 1;
            }
        }
    }

    swaps
}

/// Length saved by replacing `(t[i],t[i+1])`, `(t[j],t[j+1])` with
/// `(t[i],t[j])`, `(t[i+1],t[j+1])`.
#[inline]
fn exchange_gain(matrix: &DistanceMatrix, tour: &[usize], i: usize, j: usize) -> f64 {
    let n = tour.len();
    let (a, b) = (tour[i], tour[i + 1]);
    let (c, d) = (tour[j], tour[(j + 1) % n]);
    let current = matrix.get(a, b) + matrix.get(c, d);
    let proposal = matrix.get(a, c) + matrix.get(b, d);
    current - proposal
}

/// First improving position pair in sweep order, without touching the tour.
/// `None` means the tour is 2-opt optimal.
pub fn find_improving_pair(
    matrix: &DistanceMatrix,
    tour: &[usize],
    epsilon: f64,
) -> Option<(usize, usize)> {
    let n = tour.len();
    if n < MIN_TOUR_SIZE_FOR_OPT {
        return None;
    }
    (0..(n - 1))
        .flat_map(|i| ((i + 2)..n).map(move |j| (i, j)))
        .filter(|&(i, j)| !(i == 0 && j == n - 1))
        .find(|&(i, j)| exchange_gain(matrix, tour, i, j) > epsilon)
}

/// Reverses `tour[start..=end]` by swapping inward.
pub(crate) fn reverse_segment(tour: &mut [usize], mut start: usize, mut end: usize) {
    while start < end {
        tour.swap(start, end);
        start += 1;
        end -= 1;
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::{find_improving_pair, reverse_segment, sweep, two_opt};
    use crate::{
        DistanceMatrix, Point,
        local_search::{DEFAULT_IMPROVEMENT_EPSILON, SearchLimits, StopReason},
    };

    fn matrix(points: &[(f64, f64)]) -> DistanceMatrix {
        let points: Vec<Point> = points.iter().copied().map(Point::from).collect();
        DistanceMatrix::from_points(&points)
    }

    fn hexagon() -> Vec<(f64, f64)> {
        (0..6)
            .map(|i| {
                let angle = i as f64 * PI / 3.0;
                (angle.cos(), angle.sin())
            })
            .collect()
    }

    fn is_rotation_or_reflection(tour: &[usize], boundary: &[usize]) -> bool {
        let n = boundary.len();
        if tour.len() != n {
            return false;
        }
        let Some(offset) = boundary.iter().position(|&x| x == tour[0]) else {
            return false;
        };
        let forward = (0..n).all(|k| tour[k] == boundary[(offset + k) % n]);
        let backward = (0..n).all(|k| tour[k] == boundary[(offset + n - k) % n]);
        forward || backward
    }

    #[test]
    fn reverse_segment_swaps_inward() {
        let mut tour = vec![0, 1, 2, 3, 4, 5];
        reverse_segment(&mut tour, 1, 4);
        assert_eq!(tour, vec![0, 4, 3, 2, 1, 5]);

        reverse_segment(&mut tour, 2, 2);
        assert_eq!(tour, vec![0, 4, 3, 2, 1, 5]);
    }

    #[test]
    fn unit_square_needs_no_moves() {
        let m = matrix(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        let mut tour = vec![0, 1, 2, 3];

        let stats = two_opt(&m, &mut tour, &SearchLimits::default());

        assert_eq!(tour, vec![0, 1, 2, 3]);
        assert_eq!(stats.moves, 0);
        assert_eq!(stats.sweeps, 1);
        assert_eq!(stats.stop, StopReason::LocalOptimum);
        assert!((stats.final_length - 4.0).abs() < 1e-12);
    }

    #[test]
    fn crossing_square_is_uncrossed() {
        let m = matrix(&[(0.0, 0.0), (2.0, 2.0), (0.0, 2.0), (2.0, 0.0)]);
        let mut tour = vec![0, 1, 2, 3];

        let stats = two_opt(&m, &mut tour, &SearchLimits::default());

        assert!((m.tour_length(&tour) - 8.0).abs() < 1e-9);
        assert!(stats.moves >= 1);
        assert!(stats.final_length < stats.initial_length);
    }

    #[test]
    fn crossed_hexagon_converges_to_boundary_order() {
        let m = matrix(&hexagon());
        let mut tour = vec![0, 1, 2, 4, 3, 5];

        two_opt(&m, &mut tour, &SearchLimits::default());

        assert!(is_rotation_or_reflection(&tour, &[0, 1, 2, 3, 4, 5]));
        assert!((m.tour_length(&tour) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn result_is_two_opt_optimal() {
        let points: Vec<(f64, f64)> = (0..30)
            .map(|i| {
                let t = i as f64;
                ((t * 17.3) % 23.0, (t * 7.7) % 13.0)
            })
            .collect();
        let m = matrix(&points);
        let mut tour: Vec<usize> = (0..points.len()).collect();

        let stats = two_opt(&m, &mut tour, &SearchLimits::default());

        assert_eq!(stats.stop, StopReason::LocalOptimum);
        assert!(stats.final_length <= stats.initial_length);
        assert!(find_improving_pair(&m, &tour, DEFAULT_IMPROVEMENT_EPSILON).is_none());

        let mut sorted = tour.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..points.len()).collect::<Vec<_>>());
    }

    #[test]
    fn iteration_cap_stops_early() {
        let points: Vec<(f64, f64)> = (0..30)
            .map(|i| {
                let t = i as f64;
                ((t * 17.3) % 23.0, (t * 7.7) % 13.0)
            })
            .collect();
        let m = matrix(&points);
        let mut tour: Vec<usize> = (0..points.len()).collect();
        let initial = m.tour_length(&tour);
        let limits = SearchLimits {
            max_iterations: Some(1),
            ..SearchLimits::default()
        };

        let stats = two_opt(&m, &mut tour, &limits);

        assert_eq!(stats.sweeps, 1);
        assert_eq!(stats.stop, StopReason::IterationLimit);
        assert!(m.tour_length(&tour) <= initial);
    }

    #[test]
    fn tiny_tours_are_left_alone() {
        let m = matrix(&[(0.0, 0.0), (5.0, 0.0), (0.0, 3.0)]);
        let mut tour = vec![2, 0, 1];

        let stats = two_opt(&m, &mut tour, &SearchLimits::default());

        assert_eq!(tour, vec![2, 0, 1]);
        assert_eq!(stats.sweeps, 0);
    }

    #[test]
    fn sweep_counts_applied_swaps() {
        let m = matrix(&[(0.0, 0.0), (2.0, 2.0), (0.0, 2.0), (2.0, 0.0)]);
        let mut tour = vec![0, 1, 2, 3];
        assert_eq!(sweep(&m, &mut tour, DEFAULT_IMPROVEMENT_EPSILON), 1);
        assert_eq!(sweep(&m, &mut tour, DEFAULT_IMPROVEMENT_EPSILON), 0);
    }
}
