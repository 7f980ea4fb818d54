use std::fmt;

use rivaltris_engine::{Piece, PieceKind, PieceRotation};
use serde::{Deserialize, Serialize};

/// Where and how a piece is committed: top-left corner `(x, y)` and rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub x: usize,
    pub y: usize,
    pub rotation: PieceRotation,
}

impl Placement {
    #[must_use]
    pub const fn new(x: usize, y: usize, rotation: u8) -> Self {
        Self {
            x,
            y,
            rotation: PieceRotation::from_turns(rotation),
        }
    }

    /// Placement used when no legal position exists on a grid of the given width.
    #[must_use]
    pub const fn fallback(grid_width: usize) -> Self {
        Self::new(grid_width / 2, 0, 0)
    }

    /// A fresh piece of `kind` in this placement's rotation.
    #[must_use]
    pub fn piece(self, kind: PieceKind) -> Piece {
        Piece::new(kind).rotated_by(self.rotation.as_u8())
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={} y={} rotation={}",
            self.x,
            self.y,
            self.rotation.as_u8()
        )
    }
}
