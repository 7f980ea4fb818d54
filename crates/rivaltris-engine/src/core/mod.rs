//! Playfield geometry.
//!
//! - [`Piece`] - a tetromino of a given [`PieceKind`] in one of four rotations
//! - [`Grid`] - a fixed-size playfield stored as row bit masks, with its [`GridStats`]
//!
//! [`GridStats`]: crate::GridStats

pub use self::{grid::*, piece::*};

pub(crate) mod grid;
pub(crate) mod piece;
