//! Grid, piece and supply primitives for two-player falling-block matches.
//!
//! - [`core`](crate::core) holds the geometry: [`Piece`], [`PieceKind`] and the [`Grid`]
//!   playfield.
//! - [`engine`](crate::engine) holds match-wide state: [`GridStats`], the shared
//!   [`SupplyPool`] and the [`MatchSeed`] every random choice of a match derives from.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A piece could not be committed at the requested position.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("cannot place {kind} piece with rotation {rotation} at ({x}, {y})")]
pub struct PlacementError {
    kind: PieceKind,
    rotation: u8,
    x: usize,
    y: usize,
}

impl PlacementError {
    #[must_use]
    pub fn new(piece: &Piece, x: usize, y: usize) -> Self {
        Self {
            kind: piece.kind(),
            rotation: piece.rotation().as_u8(),
            x,
            y,
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }
}
