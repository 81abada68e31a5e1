//! Splits the input into "core" points and "isolated" points whose nearest
//! neighbour is unusually far away. Isolated points are inserted only after
//! the core tour is complete.

use crate::DistanceMatrix;

pub const DEFAULT_ISOLATION_MULTIPLIER: f64 = 1.5;

/// Disjoint partition of `0..n`; both lists are in ascending index order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Classification {
    pub core: Vec<usize>,
    pub isolated: Vec<usize>,
}

impl Classification {
    pub fn all_core(n: usize) -> Self {
        Self {
            core: (0..n).collect(),
            isolated: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.core.len() + self.isolated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Distance from each point to its nearest other point; `0.0` when there is
/// only one point.
pub fn nearest_neighbor_distances(matrix: &DistanceMatrix) -> Vec<f64> {
    let n = matrix.len();
    if n < 2 {
        return vec![0.0; n];
    }
    (0..n)
        .map(|i| {
            matrix
                .row(i)
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &d)| d)
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

/// A point is isolated iff its nearest-neighbour distance is strictly greater
/// than `multiplier` times the mean nearest-neighbour distance. If fewer than
/// two points would remain core, every point is core.
pub fn classify(matrix: &DistanceMatrix, multiplier: f64) -> Classification {
    let n = matrix.len();
    if n == 0 {
        return Classification::default();
    }

    let nearest = nearest_neighbor_distances(matrix);
    let mean = nearest.iter().sum::<f64>() / n as f64;
    let threshold = mean * multiplier;

    let (isolated, core): (Vec<usize>, Vec<usize>) =
        (0..n).partition(|&i| nearest[i] > threshold);

    if core.len() < 2 {
        log::debug!(
            "isolation: reset n={n} core={} reason=insufficient_core",
            core.len()
        );
        return Classification::all_core(n);
    }

    log::info!(
        "isolation: n={n} mean_nearest={mean:.4} threshold={threshold:.4} core={} isolated={}",
        core.len(),
        isolated.len()
    );
    Classification { core, isolated }
}
