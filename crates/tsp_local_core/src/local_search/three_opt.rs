//! 3-opt refinement with full restart after every applied move.
//!
//! Cutting edges `(A,B)`, `(C,D)`, `(E,F)` at positions `i < j < k` splits
//! the tour into `prefix | S1 = B..C | S2 = D..E | suffix`. The seven
//! [`Reconnection`]s rebuild `S1 S2` in every other way that keeps a single
//! cycle. Reassembly moves whole segments, so positions after `i` are stale
//! once a move is applied and the scan starts over.

use std::fmt;

use crate::{
    DistanceMatrix,
    local_search::{Budget, MIN_TOUR_SIZE_FOR_OPT, SearchLimits, SearchStats, StopReason},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reconnection {
    /// `rev(S1) S2`: A-C, B-D, E-F.
    ReverseFirst,
    /// `S1 rev(S2)`: A-B, C-E, D-F.
    ReverseSecond,
    /// `rev(S1 S2)`: A-E, D-C, B-F.
    ReverseSpan,
    /// `rev(S1) rev(S2)`: A-C, B-E, D-F.
    ReverseEach,
    /// `S2 S1`: A-D, E-B, C-F.
    Swap,
    /// `rev(S2) S1`: A-E, D-B, C-F.
    SwapReverseSecond,
    /// `S2 rev(S1)`: A-D, E-C, B-F.
    SwapReverseFirst,
}

impl Reconnection {
    pub const ALL: [Self; 7] = [
        Self::ReverseFirst,
        Self::ReverseSecond,
        Self::ReverseSpan,
        Self::ReverseEach,
        Self::Swap,
        Self::SwapReverseSecond,
        Self::SwapReverseFirst,
    ];

    /// The first three only replace two edges; the rest replace all three.
    pub fn is_two_opt(self) -> bool {
        matches!(
            self,
            Self::ReverseFirst | Self::ReverseSecond | Self::ReverseSpan
        )
    }

    /// Length of the three edges this pattern creates.
    #[inline]
    fn added_length(self, matrix: &DistanceMatrix, ends: &CutEnds) -> f64 {
        let &CutEnds { a, b, c, d, e, f } = ends;
        let m = |x: usize, y: usize| matrix.get(x, y);
        match self {
            Self::ReverseFirst => m(a, c) + m(b, d) + m(e, f),
            Self::ReverseSecond => m(a, b) + m(c, e) + m(d, f),
            Self::ReverseSpan => m(a, e) + m(d, c) + m(b, f),
            Self::ReverseEach => m(a, c) + m(b, e) + m(d, f),
            Self::Swap => m(a, d) + m(e, b) + m(c, f),
            Self::SwapReverseSecond => m(a, e) + m(d, b) + m(c, f),
            Self::SwapReverseFirst => m(a, d) + m(e, c) + m(b, f),
        }
    }

    fn reassemble(self, s1: &[usize], s2: &[usize]) -> Vec<usize> {
        let mut out = Vec::with_capacity(s1.len() + s2.len());
        match self {
            Self::ReverseFirst => {
                out.extend(s1.iter().rev());
                out.extend_from_slice(s2);
            }
            Self::ReverseSecond => {
                out.extend_from_slice(s1);
                out.extend(s2.iter().rev());
            }
            Self::ReverseSpan => {
                out.extend(s2.iter().rev());
                out.extend(s1.iter().rev());
            }
            Self::ReverseEach => {
                out.extend(s1.iter().rev());
                out.extend(s2.iter().rev());
            }
            Self::Swap => {
                out.extend_from_slice(s2);
                out.extend_from_slice(s1);
            }
            Self::SwapReverseSecond => {
                out.extend(s2.iter().rev());
                out.extend_from_slice(s1);
            }
            Self::SwapReverseFirst => {
                out.extend_from_slice(s2);
                out.extend(s1.iter().rev());
            }
        }
        out
    }
}

impl fmt::Display for Reconnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ReverseFirst => "d1",
            Self::ReverseSecond => "d2",
            Self::ReverseSpan => "d3",
            Self::ReverseEach => "d4",
            Self::Swap => "d5",
            Self::SwapReverseSecond => "d6",
            Self::SwapReverseFirst => "d7",
        };
        f.write_str(label)
    }
}

/// Node ids at the three cut edges.
struct CutEnds {
    a: usize,
    b: usize,
    c: usize,
    d: usize,
    e: usize,
    f: usize,
}

impl CutEnds {
    fn at(tour: &[usize], i: usize, j: usize, k: usize) -> Self {
        let n = tour.len();
        Self {
            a: tour[i],
            b: tour[i + 1],
            c: tour[j],
            d: tour[j + 1],
            e: tour[k],
            f: tour[(k + 1) % n],
        }
    }

    fn removed_length(&self, matrix: &DistanceMatrix) -> f64 {
        matrix.get(self.a, self.b) + matrix.get(self.c, self.d) + matrix.get(self.e, self.f)
    }
}

/// An improving 3-opt candidate. Positions refer to the tour it was found in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Move {
    pub i: usize,
    pub j: usize,
    pub k: usize,
    pub reconnection: Reconnection,
    /// Length saved by applying the move.
    pub gain: f64,
}

impl Move {
    /// Replaces `tour[i+1..=k]` with the reassembled segments.
    pub fn apply(&self, tour: &mut [usize]) {
        let reassembled = {
            let s1 = &tour[(self.i + 1)..=self.j];
            let s2 = &tour[(self.j + 1)..=self.k];
            self.reconnection.reassemble(s1, s2)
        };
        tour[(self.i + 1)..=self.k].copy_from_slice(&reassembled);
    }
}

/// Scans every cut triple `i < j < k` and every reconnection, returning the
/// move with the largest gain above `epsilon`. Equal gains keep the earliest
/// triple in scan order, then the lowest pattern.
pub fn find_best_move(tour: &[usize], matrix: &DistanceMatrix, epsilon: f64) -> Option<Move> {
    let n = tour.len();
    if n < MIN_TOUR_SIZE_FOR_OPT {
        return None;
    }

    let mut best: Option<Move> = None;
    for i in 0..(n - 2) {
        for j in (i + 1)..(n - 1) {
            for k in (j + 1)..n {
                let ends = CutEnds::at(tour, i, j, k);
                let removed = ends.removed_length(matrix);
                for reconnection in Reconnection::ALL {
                    let gain = removed - reconnection.added_length(matrix, &ends);
                    if gain > epsilon && best.is_none_or(|b| gain > b.gain) {
                        best = Some(Move {
                            i,
                            j,
                            k,
                            reconnection,
                            gain,
                        });
                    }
                }
            }
        }
    }
    best
}

/// Applies the best move and rescans until none improves.
#[tsp_local_derive::timer("three_opt")]
pub fn three_opt(
    matrix: &DistanceMatrix,
    tour: &mut [usize],
    limits: &SearchLimits,
) -> SearchStats {
    let n = tour.len();
    let mut stats = SearchStats::start(matrix.tour_length(tour));
    if n < MIN_TOUR_SIZE_FOR_OPT {
        log::debug!("three_opt: skip n={n} reason=insufficient_size");
        return stats;
    }

    log::info!(
        "three_opt: start n={n} length={:.4}",
        stats.initial_length
    );

    let budget = Budget::start(limits);
    loop {
        if let Some(reason) = budget.exhausted(stats.moves) {
            stats.stop = reason;
            break;
        }

        stats.sweeps += 1;
        let Some(mv) = find_best_move(tour, matrix, limits.epsilon) else {
            stats.stop = StopReason::LocalOptimum;
            break;
        };

        mv.apply(tour);
        stats.moves += 1;
        log::debug!(
            "three_opt: move={} i={} j={} k={} pattern={} kind={} gain={:.6}",
            stats.moves,
            mv.i,
            mv.j,
            mv.k,
            mv.reconnection,
            if mv.reconnection.is_two_opt() { "2opt" } else { "3opt" },
            mv.gain
        );
    }

    stats.final_length = matrix.tour_length(tour);
    log::info!(
        "three_opt: complete sweeps={} moves={} length={:.4} stop={}",
        stats.sweeps,
        stats.moves,
        stats.final_length,
        stats.stop
    );
    stats
}
