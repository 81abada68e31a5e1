use crate::{DistanceMatrix, Error, Result};

/// Edge statistics of a closed tour. `outliers` counts edges longer than
/// `threshold = average * factor`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TourMetrics {
    pub longest: f64,
    pub outliers: usize,
    pub total: f64,
    pub average: f64,
    pub threshold: f64,
}

impl TourMetrics {
    pub fn measure(matrix: &DistanceMatrix, tour: &[usize], threshold_factor: f64) -> Self {
        let n = tour.len();
        if n < 2 {
            log::info!("metrics: n={n} nothing to report");
            return Self::default();
        }

        let distances: Vec<f64> = (0..n)
            .map(|i| matrix.get(tour[i], tour[(i + 1) % n]))
            .collect();
        let total: f64 = distances.iter().sum();
        let average = total / n as f64;
        let threshold = average * threshold_factor;
        let outliers = distances.iter().filter(|d| **d > threshold).count();
        let longest = distances.iter().copied().fold(0.0_f64, f64::max);

        log::info!(
            "metrics: n={n} total={total:.4} longest={longest:.4} avg={average:.4} outlier_threshold={threshold:.4} outliers={outliers}",
        );

        Self {
            longest,
            outliers,
            total,
            average,
            threshold,
        }
    }
}

/// Checks that `tour` visits each of `0..n` exactly once.
pub fn validate_permutation(tour: &[usize], n: usize) -> Result<()> {
    if tour.len() != n {
        return Err(Error::other(format!(
            "tour has {} entries, expected {n}",
            tour.len()
        )));
    }
    let mut seen = vec![false; n];
    for &idx in tour {
        if idx >= n {
            return Err(Error::other(format!("tour index {idx} out of range 0..{n}")));
        }
        if std::mem::replace(&mut seen[idx], true) {
            return Err(Error::other(format!("tour visits index {idx} twice")));
        }
    }
    Ok(())
}
