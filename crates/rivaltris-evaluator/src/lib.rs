//! Placement search and strategy heuristics for rivaltris matches.
//!
//! The crate is layered the same way a decision is made:
//!
//! ```text
//! DecisionEngine (search every rotation × column, keep the best)
//!     ↓ uses
//! PlacementEvaluator (score one placement)
//!     ↓ uses
//! PlacementAnalysis (metrics of the grid right after the piece lands)
//! ```
//!
//! - [`strategy`] - the closed set of playing styles, their weights and attack preferences
//! - [`placement`] - the `(x, y, rotation)` a decision returns
//! - [`placement_analysis`] - post-placement grid metrics, measured before any line clear
//! - [`placement_evaluator`] - the [`PlacementEvaluator`] trait and its linear heuristic
//! - [`decision_engine`] - the search itself, per-decision timing and attack piece selection
//!
//! # Example
//!
//! ```
//! use rivaltris_engine::{Grid, PieceKind};
//! use rivaltris_evaluator::{DecisionEngine, Strategy};
//!
//! let mut engine = DecisionEngine::new("AI-1", Strategy::Greedy);
//! let decision = engine.decide_placement(&Grid::default(), PieceKind::I);
//!
//! assert_eq!((decision.placement.x, decision.placement.y), (0, 19));
//! assert_eq!(engine.decision_times().len(), 1);
//! ```
//!
//! [`PlacementEvaluator`]: placement_evaluator::PlacementEvaluator

pub use self::{
    decision_engine::{Decision, DecisionEngine},
    placement::Placement,
    strategy::{HeuristicWeights, ParseStrategyError, Strategy},
};

pub mod decision_engine;
pub mod placement;
pub mod placement_analysis;
pub mod placement_evaluator;
pub mod strategy;
