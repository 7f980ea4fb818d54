//! Placement decisions for one side of a match.
//!
//! A [`DecisionEngine`] owns a name, a [`Strategy`] and a [`PlacementEvaluator`]. Each call to
//! [`DecisionEngine::decide_placement`] runs an exhaustive greedy search over the current grid:
//!
//! 1. **Enumerate** - rotations `0..4`, and for each rotation every column `x` in
//!    `0..=width - piece_width`
//! 2. **Hard drop** - lower the piece from row `0` while it fits; skip columns where it does
//!    not fit at row `0`
//! 3. **Score** - analyze the grid with the piece placed (no clearing) and evaluate it
//! 4. **Select** - keep the first maximum (strict `>`), so ties go to the lowest rotation, then
//!    the lowest `x`
//!
//! When nothing fits, the engine answers with [`Placement::fallback`], which the caller will
//! find invalid. Every call, fallback included, records exactly one elapsed-time sample.
//!
//! The search only looks one piece ahead and knows nothing about the opponent.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use rand::{Rng, seq::IndexedRandom as _};
use rivaltris_engine::{Grid, Piece, PieceKind, SupplyPool};

use crate::{
    placement::Placement,
    placement_analysis::PlacementAnalysis,
    placement_evaluator::{HeuristicPlacementEvaluator, PlacementEvaluator},
    strategy::Strategy,
};

/// Result of one placement search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub placement: Placement,
    /// `None` when no legal placement existed and the fallback was returned.
    pub score: Option<f32>,
    pub elapsed: Duration,
}

impl Decision {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.score.is_none()
    }
}

#[derive(Debug)]
pub struct DecisionEngine {
    name: String,
    strategy: Strategy,
    evaluator: Box<dyn PlacementEvaluator>,
    decision_times: Vec<Duration>,
}

impl DecisionEngine {
    /// Creates an engine scoring placements with the strategy's heuristic weights.
    #[must_use]
    pub fn new(name: impl Into<String>, strategy: Strategy) -> Self {
        Self::with_evaluator(
            name,
            strategy,
            Box::new(HeuristicPlacementEvaluator::for_strategy(strategy)),
        )
    }

    /// Like [`Self::new`], but with a custom evaluator.
    ///
    /// The strategy still drives attack piece selection.
    #[must_use]
    pub fn with_evaluator(
        name: impl Into<String>,
        strategy: Strategy,
        evaluator: Box<dyn PlacementEvaluator>,
    ) -> Self {
        Self {
            name: name.into(),
            strategy,
            evaluator,
            decision_times: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Every recorded decision latency, oldest first.
    #[must_use]
    pub fn decision_times(&self) -> &[Duration] {
        &self.decision_times
    }

    #[must_use]
    pub fn last_decision_time(&self) -> Option<Duration> {
        self.decision_times.last().copied()
    }

    /// Mean decision latency, zero when no decision was made yet.
    #[must_use]
    pub fn average_decision_time(&self) -> Duration {
        let Ok(count) = u32::try_from(self.decision_times.len()) else {
            return Duration::ZERO;
        };
        if count == 0 {
            return Duration::ZERO;
        }
        self.decision_times.iter().sum::<Duration>() / count
    }

    /// Searches the best placement of a `kind` piece on `grid`.
    pub fn decide_placement(&mut self, grid: &Grid, kind: PieceKind) -> Decision {
        let start = Instant::now();
        let best = self.select_best_placement(grid, kind);
        let elapsed = start.elapsed();
        self.decision_times.push(elapsed);

        match best {
            Some((analysis, score)) => Decision {
                placement: analysis.placement(),
                score: Some(score),
                elapsed,
            },
            None => {
                log::debug!(
                    "{}: no legal placement for {kind}, using fallback",
                    self.name
                );
                Decision {
                    placement: Placement::fallback(grid.width()),
                    score: None,
                    elapsed,
                }
            }
        }
    }

    /// Scores every reachable placement and returns the first one with the highest score.
    #[must_use]
    pub fn select_best_placement(
        &self,
        grid: &Grid,
        kind: PieceKind,
    ) -> Option<(PlacementAnalysis, f32)> {
        let mut best: Option<(PlacementAnalysis, f32)> = None;

        for placement in available_placements(grid, kind) {
            let analysis = PlacementAnalysis::from_grid(grid, kind, placement);
            let score = self.evaluator.evaluate_placement(&analysis);
            if best.as_ref().is_none_or(|(_, best_score)| score > *best_score) {
                best = Some((analysis, score));
            }
        }

        best
    }

    /// Picks the kind this engine wants as its own next piece.
    ///
    /// Chooses uniformly among the available kinds the strategy prefers, or among all
    /// available kinds when none of the preferred ones is left. Returns `None` for an exhausted
    /// pool. Does not draw from the pool.
    pub fn choose_attack_piece<R>(&self, pool: &SupplyPool, rng: &mut R) -> Option<PieceKind>
    where
        R: Rng + ?Sized,
    {
        let available = pool.available_kinds();
        let preferred: ArrayVec<PieceKind, { PieceKind::LEN }> = available
            .iter()
            .copied()
            .filter(|kind| self.strategy.attack_preference().contains(kind))
            .collect();

        if preferred.is_empty() {
            available.choose(rng).copied()
        } else {
            preferred.choose(rng).copied()
        }
    }
}

/// Resting placements in search order: rotation ascending, then `x` ascending.
fn available_placements(grid: &Grid, kind: PieceKind) -> impl Iterator<Item = Placement> + '_ {
    (0..4u8).flat_map(move |turns| {
        let piece = Piece::new(kind).rotated_by(turns);
        let max_x = grid.width().checked_sub(piece.width());
        max_x
            .into_iter()
            .flat_map(|max_x| 0..=max_x)
            .filter_map(move |x| {
                drop_row(grid, &piece, x).map(|y| Placement::new(x, y, turns))
            })
    })
}

/// Lowest row the piece reaches when dropped from the top at column `x`.
fn drop_row(grid: &Grid, piece: &Piece, x: usize) -> Option<usize> {
    if !grid.can_place(piece, x, 0) {
        return None;
    }
    let mut y = 0;
    while grid.can_place(piece, x, y + 1) {
        y += 1;
    }
    Some(y)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn blocked_grid() -> Grid {
        Grid::from_ascii(
            4,
            4,
            r"
            #.##
            ##.#
            #.##
            ##.#
            ",
        )
    }

    #[test]
    fn test_i_piece_lands_on_floor_of_empty_grid() {
        let mut engine = DecisionEngine::new("AI-1", Strategy::Greedy);
        let grid = Grid::default();
        let decision = engine.decide_placement(&grid, PieceKind::I);
        assert_eq!(decision.placement, Placement::new(0, 19, 0));

        let mut grid = grid;
        let piece = decision.placement.piece(PieceKind::I);
        grid.try_place(&piece, decision.placement.x, decision.placement.y)
            .unwrap();
        assert!(!grid.is_game_over());
    }

    #[test]
    fn test_ties_go_to_lowest_rotation_then_x() {
        let engine = DecisionEngine::new("tie", Strategy::Other);
        let (analysis, score) = engine
            .select_best_placement(&Grid::default(), PieceKind::O)
            .unwrap();
        assert_eq!(analysis.placement(), Placement::new(0, 18, 0));
        assert!((score - -2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_aggressive_takes_the_line_clear() {
        let grid = Grid::from_ascii(
            10,
            20,
            r"
            ####.#####
            ",
        );
        let mut engine = DecisionEngine::new("AI-2", Strategy::Aggressive);
        let decision = engine.decide_placement(&grid, PieceKind::I);
        assert_eq!(decision.placement, Placement::new(4, 16, 1));
        assert!(!decision.is_fallback());
    }

    #[test]
    fn test_decision_is_deterministic() {
        let grid = Grid::from_ascii(
            10,
            20,
            r"
            ...##.....
            #.####..##
            ",
        );
        for strategy in Strategy::ALL {
            for kind in PieceKind::ALL {
                let mut a = DecisionEngine::new("a", strategy);
                let mut b = DecisionEngine::new("b", strategy);
                assert_eq!(
                    a.decide_placement(&grid, kind).placement,
                    b.decide_placement(&grid, kind).placement
                );
            }
        }
    }

    #[test]
    fn test_fallback_when_nothing_fits() {
        let mut engine = DecisionEngine::new("stuck", Strategy::Defensive);
        let grid = blocked_grid();
        for kind in PieceKind::ALL {
            let decision = engine.decide_placement(&grid, kind);
            assert!(decision.is_fallback());
            assert_eq!(decision.placement, Placement::new(2, 0, 0));
        }
        assert_eq!(engine.decision_times().len(), PieceKind::LEN);
    }

    #[test]
    fn test_one_sample_per_decision() {
        let mut engine = DecisionEngine::new("timer", Strategy::Greedy);
        assert_eq!(engine.average_decision_time(), Duration::ZERO);
        assert_eq!(engine.last_decision_time(), None);

        let grid = Grid::default();
        for _ in 0..3 {
            engine.decide_placement(&grid, PieceKind::T);
        }
        assert_eq!(engine.decision_times().len(), 3);
        assert!(engine.last_decision_time().is_some());
        assert!(engine.average_decision_time() <= engine.decision_times().iter().sum::<Duration>());
    }

    #[test]
    fn test_attack_piece_respects_preference() {
        let pool = SupplyPool::new(3);
        let mut rng = Pcg32::seed_from_u64(1);
        let aggressive = DecisionEngine::new("a", Strategy::Aggressive);
        let defensive = DecisionEngine::new("d", Strategy::Defensive);
        for _ in 0..100 {
            let kind = aggressive.choose_attack_piece(&pool, &mut rng).unwrap();
            assert!(matches!(kind, PieceKind::T | PieceKind::L | PieceKind::J));
            let kind = defensive.choose_attack_piece(&pool, &mut rng).unwrap();
            assert!(matches!(kind, PieceKind::I | PieceKind::O));
        }
        assert_eq!(pool.total_remaining(), 21);
    }

    #[test]
    fn test_attack_piece_falls_back_to_any_available() {
        let mut pool = SupplyPool::new(1);
        for kind in [PieceKind::T, PieceKind::L, PieceKind::J, PieceKind::I] {
            assert!(pool.draw(kind));
        }
        let mut rng = Pcg32::seed_from_u64(2);
        let aggressive = DecisionEngine::new("a", Strategy::Aggressive);
        for _ in 0..50 {
            let kind = aggressive.choose_attack_piece(&pool, &mut rng).unwrap();
            assert!(pool.is_available(kind));
        }
    }

    #[test]
    fn test_attack_piece_on_empty_pool() {
        let pool = SupplyPool::new(0);
        let mut rng = Pcg32::seed_from_u64(3);
        for strategy in Strategy::ALL {
            let engine = DecisionEngine::new("e", strategy);
            assert_eq!(engine.choose_attack_piece(&pool, &mut rng), None);
        }
    }
}
