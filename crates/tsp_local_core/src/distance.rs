use crate::Point;

/// Dense symmetric table of pairwise Euclidean distances, stored row-major.
#[derive(Clone, Debug, Default)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Computes every unordered pair once and mirrors it. Non-finite
    /// coordinates are not rejected here; they propagate into the table.
    pub fn from_points(points: &[Point]) -> Self {
        let n = points.len();
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = points[i].dist(&points[j]);
                data[i * n + j] = d;
                data[j * n + i] = d;
            }
        }
        log::debug!("distance: built n={n} entries={}", n * n);
        Self { n, data }
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Closed-tour length: consecutive distances plus the wrap edge.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        let n = tour.len();
        if n < 2 {
            return 0.0;
        }
        (0..n).map(|i| self.get(tour[i], tour[(i + 1) % n])).sum()
    }
}
