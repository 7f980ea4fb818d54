//! Match-wide state shared between the two sides.
//!
//! - [`GridStats`] - cumulative score and line clears of one grid
//! - [`SupplyPool`] - finite per-kind piece supply with an unbounded fallback
//! - [`MatchSeed`] - seed for the single random source of a match

pub use self::{grid_stats::*, match_seed::*, supply_pool::*};

pub(crate) mod grid_stats;
mod match_seed;
mod supply_pool;
