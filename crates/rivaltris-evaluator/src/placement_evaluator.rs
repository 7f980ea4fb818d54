//! Placement evaluation: scoring a single candidate placement.
//!
//! The [`HeuristicPlacementEvaluator`] scores a [`PlacementAnalysis`] as a linear combination
//! of grid metrics:
//!
//! ```text
//! score = w_h·max_height + w_H·holes + w_B·bumpiness + w_L·full_rows
//! ```
//!
//! The weights come from the engine's [`Strategy`]. Higher scores are better.

use std::fmt;

use crate::{
    placement_analysis::PlacementAnalysis,
    strategy::{HeuristicWeights, Strategy},
};

/// Evaluates piece placements by assigning scores (higher is better).
pub trait PlacementEvaluator: fmt::Debug + Send + Sync {
    fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f32;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicPlacementEvaluator {
    weights: HeuristicWeights,
}

impl HeuristicPlacementEvaluator {
    #[must_use]
    pub const fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub const fn for_strategy(strategy: Strategy) -> Self {
        Self::new(strategy.weights())
    }

    #[must_use]
    pub const fn weights(&self) -> &HeuristicWeights {
        &self.weights
    }
}

#[expect(clippy::cast_precision_loss)]
fn metric(value: usize) -> f32 {
    value as f32
}

impl PlacementEvaluator for HeuristicPlacementEvaluator {
    #[inline]
    fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f32 {
        let w = &self.weights;
        w.height * metric(analysis.max_height())
            + w.holes * metric(analysis.holes())
            + w.bumpiness * metric(analysis.bumpiness())
            + w.lines * metric(analysis.full_rows())
    }
}
