//! Analysis of grid state after a candidate placement.
//!
//! [`PlacementAnalysis`] places a piece on a throwaway copy of the grid and records the metrics
//! the heuristics look at. Full rows are counted but **not** cleared, so height and holes are
//! measured on the grid exactly as it looks the moment the piece lands.
//!
//! ```
//! use rivaltris_engine::{Grid, PieceKind};
//! use rivaltris_evaluator::placement::Placement;
//! use rivaltris_evaluator::placement_analysis::PlacementAnalysis;
//!
//! let grid = Grid::from_ascii(4, 4, "###.\n");
//! let placement = Placement::new(3, 0, 1);
//! let analysis = PlacementAnalysis::from_grid(&grid, PieceKind::I, placement);
//!
//! assert_eq!(analysis.full_rows(), 1);
//! assert_eq!(analysis.max_height(), 4);
//! ```

use rivaltris_engine::{Grid, PieceKind};

use crate::placement::Placement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementAnalysis {
    kind: PieceKind,
    placement: Placement,
    max_height: usize,
    holes: usize,
    bumpiness: usize,
    full_rows: usize,
}

impl PlacementAnalysis {
    #[must_use]
    pub fn from_grid(before_placement: &Grid, kind: PieceKind, placement: Placement) -> Self {
        let mut grid = before_placement.clone();
        grid.place(&placement.piece(kind), placement.x, placement.y);

        Self {
            kind,
            placement,
            max_height: grid.max_height(),
            holes: grid.holes(),
            bumpiness: grid.bumpiness(),
            full_rows: grid.full_row_count(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    #[must_use]
    pub fn max_height(&self) -> usize {
        self.max_height
    }

    #[must_use]
    pub fn holes(&self) -> usize {
        self.holes
    }

    #[must_use]
    pub fn bumpiness(&self) -> usize {
        self.bumpiness
    }

    /// Rows the placement completes.
    #[must_use]
    pub fn full_rows(&self) -> usize {
        self.full_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_measured_before_clearing() {
        let grid = Grid::from_ascii(
            4,
            6,
            r"
            #...
            ",
        );
        let analysis = PlacementAnalysis::from_grid(&grid, PieceKind::T, Placement::new(1, 4, 0));
        assert_eq!(analysis.full_rows(), 1);
        assert_eq!(analysis.max_height(), 2);
        assert_eq!(analysis.holes(), 0);
        assert_eq!(analysis.bumpiness(), 2);
    }

    #[test]
    fn test_source_grid_untouched() {
        let grid = Grid::default();
        let analysis = PlacementAnalysis::from_grid(&grid, PieceKind::O, Placement::new(0, 18, 0));
        assert_eq!(analysis.max_height(), 2);
        assert_eq!(grid.max_height(), 0);
    }
}
