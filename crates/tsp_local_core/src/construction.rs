//! Cheapest-insertion tour construction.
//!
//! Core points are inserted first, starting from the lowest core index; the
//! isolated points are then inserted into the finished core tour with the
//! same rule. Every step picks the globally cheapest `(point, edge)` pair.
//! Ties go to the lowest point index, then the lowest edge position, so the
//! result only depends on the input order.

use crate::{DistanceMatrix, isolation::Classification};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Insertion {
    /// Position of the point in the remaining list.
    pub(crate) slot: usize,
    /// The point goes between `tour[edge]` and `tour[edge + 1]` (wrapping).
    pub(crate) edge: usize,
    pub(crate) cost: f64,
}

#[inline]
pub(crate) fn insertion_cost(matrix: &DistanceMatrix, p: usize, u: usize, v: usize) -> f64 {
    matrix.get(u, p) + matrix.get(p, v) - matrix.get(u, v)
}

#[tsp_local_derive::timer("construction")]
pub fn build_tour(matrix: &DistanceMatrix, classification: &Classification) -> Vec<usize> {
    let n = classification.len();
    if n == 0 {
        log::debug!("construction: skip reason=empty_input");
        return Vec::new();
    }

    let mut core = classification.core.clone();
    let mut isolated = classification.isolated.clone();
    core.sort_unstable();
    isolated.sort_unstable();

    let seed = if core.is_empty() {
        isolated.remove(0)
    } else {
        core.remove(0)
    };
    let mut tour = Vec::with_capacity(n);
    tour.push(seed);

    insert_all(matrix, &mut tour, core);
    let core_length = matrix.tour_length(&tour);
    insert_all(matrix, &mut tour, isolated);

    log::info!(
        "construction: complete n={} core_length={core_length:.4} length={:.4}",
        tour.len(),
        matrix.tour_length(&tour)
    );
    tour
}

/// Inserts every point of `remaining` (ascending) into `tour`.
fn insert_all(matrix: &DistanceMatrix, tour: &mut Vec<usize>, mut remaining: Vec<usize>) {
    while let Some(best) = cheapest_insertion(matrix, tour, &remaining) {
        let point = remaining.remove(best.slot);
        tour.insert(best.edge + 1, point);
        log::trace!(
            "construction.insert: point={point} edge={} cost={:.4}",
            best.edge,
            best.cost
        );
    }
}

pub(crate) fn cheapest_insertion(
    matrix: &DistanceMatrix,
    tour: &[usize],
    remaining: &[usize],
) -> Option<Insertion> {
    let len = tour.len();
    if len == 0 {
        return None;
    }

    let mut best: Option<Insertion> = None;
    for (slot, &p) in remaining.iter().enumerate() {
        for edge in 0..len {
            let cost = insertion_cost(matrix, p, tour[edge], tour[(edge + 1) % len]);
            if best.is_none_or(|b| cost < b.cost) {
                best = Some(Insertion { slot, edge, cost });
            }
        }
    }
    best
}
