use std::fmt;

use rand::Rng;

use crate::{PlacementError, engine::grid_stats::GridStats};

use super::piece::Piece;

/// Single row of a [`Grid`], stored as a bit mask.
///
/// Bit `x` (LSB first) is set when column `x` is filled. Bits at or above the grid width are
/// always zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GridRow {
    bits: u64,
}

impl GridRow {
    pub const EMPTY: Self = Self { bits: 0 };

    const fn full_mask(width: usize) -> u64 {
        if width >= 64 {
            u64::MAX
        } else {
            (1 << width) - 1
        }
    }

    /// A row filled everywhere except column `hole`.
    fn garbage(width: usize, hole: usize) -> Self {
        Self {
            bits: Self::full_mask(width) & !(1 << hole),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_cell_filled(self, x: usize) -> bool {
        (self.bits >> x) & 1 != 0
    }

    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Checks if every cell of a row of the given width is filled.
    #[inline]
    #[must_use]
    pub fn is_full(self, width: usize) -> bool {
        self.bits == Self::full_mask(width)
    }

    #[must_use]
    pub fn filled_count(self) -> usize {
        self.bits.count_ones() as usize
    }

    #[inline]
    fn fill_cell(&mut self, x: usize) {
        self.bits |= 1 << x;
    }

    /// Iterates over the first `width` cells, returning their filled status.
    pub fn cells(self, width: usize) -> impl Iterator<Item = bool> {
        (0..width).map(move |x| self.is_cell_filled(x))
    }
}

/// A fixed-size playfield for one side of a match.
///
/// The grid keeps its cells together with the side's cumulative statistics and a terminal flag.
/// Row `0` is the top row; `y` grows downward. Width and height never change after creation.
///
/// # Example
///
/// ```
/// use rivaltris_engine::{Grid, Piece, PieceKind};
///
/// let mut grid = Grid::default();
/// let piece = Piece::new(PieceKind::I);
///
/// assert!(grid.can_place(&piece, 0, 19));
/// grid.place(&piece, 0, 19);
/// assert_eq!(grid.max_height(), 1);
/// assert!(!grid.is_game_over());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    rows: Vec<GridRow>,
    stats: GridStats,
    terminal: bool,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(Self::CANONICAL_WIDTH, Self::CANONICAL_HEIGHT)
    }
}

impl Grid {
    pub const CANONICAL_WIDTH: usize = 10;
    pub const CANONICAL_HEIGHT: usize = 20;
    /// Widest grid a [`GridRow`] mask can hold.
    pub const MAX_WIDTH: usize = 64;

    /// Creates an empty grid.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero or above [`Self::MAX_WIDTH`], or if `height` is zero.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        assert!(
            (1..=Self::MAX_WIDTH).contains(&width),
            "grid width must be in 1..={}, got {width}",
            Self::MAX_WIDTH
        );
        assert!(height > 0, "grid height must be positive");
        Self {
            width,
            height,
            rows: vec![GridRow::EMPTY; height],
            stats: GridStats::new(),
            terminal: false,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Rows from top to bottom.
    #[must_use]
    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    #[must_use]
    pub fn is_cell_filled(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.rows[y].is_cell_filled(x)
    }

    #[must_use]
    pub fn stats(&self) -> &GridStats {
        &self.stats
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.stats.score()
    }

    #[must_use]
    pub fn total_cleared_lines(&self) -> usize {
        self.stats.total_cleared_lines()
    }

    /// Checks that every filled cell of `piece` lands in bounds on an empty cell when the
    /// piece's top-left corner sits at `(x, y)`.
    #[must_use]
    pub fn can_place(&self, piece: &Piece, x: usize, y: usize) -> bool {
        piece.occupied_cells().all(|(dx, dy)| {
            let (bx, by) = (x + dx, y + dy);
            bx < self.width && by < self.height && !self.rows[by].is_cell_filled(bx)
        })
    }

    /// Marks the piece's cells as filled.
    ///
    /// No validity check is made: callers verify with [`Self::can_place`] first. Cells that
    /// fall outside the grid are dropped.
    pub fn place(&mut self, piece: &Piece, x: usize, y: usize) {
        for (dx, dy) in piece.occupied_cells() {
            let (bx, by) = (x + dx, y + dy);
            if bx < self.width && by < self.height {
                self.rows[by].fill_cell(bx);
            }
        }
    }

    /// Places the piece if [`Self::can_place`] allows it and counts it as a committed piece.
    pub fn try_place(&mut self, piece: &Piece, x: usize, y: usize) -> Result<(), PlacementError> {
        if !self.can_place(piece, x, y) {
            return Err(PlacementError::new(piece, x, y));
        }
        self.place(piece, x, y);
        self.stats.complete_piece();
        Ok(())
    }

    /// Clears filled lines and returns the number of lines cleared.
    ///
    /// Remaining rows keep their relative order and drop down; the same number of empty rows
    /// is inserted at the top. Score and line totals are updated through [`GridStats`].
    pub fn clear_lines(&mut self) -> usize {
        let width = self.width;
        let mut count = 0;

        for y in (0..self.height).rev() {
            if self.rows[y].is_full(width) {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }

        self.rows[..count].fill(GridRow::EMPTY);
        self.stats.record_line_clear(count);
        count
    }

    /// Injects `lines` garbage rows at the bottom.
    ///
    /// Each injection drops the topmost row, whatever it holds, and appends a bottom row that is
    /// filled except for one uniformly chosen column.
    pub fn add_garbage<R>(&mut self, lines: usize, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for _ in 0..lines {
            let hole = rng.random_range(0..self.width);
            self.rows.rotate_left(1);
            self.rows[self.height - 1] = GridRow::garbage(self.width, hole);
        }
    }

    /// Returns `true` when the top row holds any filled cell or the grid was marked terminal.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.terminal || !self.rows[0].is_empty()
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Latches the terminal flag. It is never cleared afterwards.
    pub fn mark_terminal(&mut self) {
        self.terminal = true;
    }

    /// Height of each column: distance from the bottom to the highest filled cell, else zero.
    #[must_use]
    pub fn column_heights(&self) -> Vec<usize> {
        (0..self.width)
            .map(|x| {
                self.rows
                    .iter()
                    .position(|row| row.is_cell_filled(x))
                    .map_or(0, |top| self.height - top)
            })
            .collect()
    }

    #[must_use]
    pub fn max_height(&self) -> usize {
        self.column_heights().into_iter().max().unwrap_or(0)
    }

    /// Sum of absolute height differences between adjacent columns.
    #[must_use]
    pub fn bumpiness(&self) -> usize {
        self.column_heights()
            .windows(2)
            .map(|w| w[0].abs_diff(w[1]))
            .sum()
    }

    /// Empty cells lying strictly below the topmost filled cell of their column.
    #[must_use]
    pub fn holes(&self) -> usize {
        (0..self.width)
            .map(|x| {
                let mut found_block = false;
                let mut holes = 0;
                for row in &self.rows {
                    if row.is_cell_filled(x) {
                        found_block = true;
                    } else if found_block {
                        holes += 1;
                    }
                }
                holes
            })
            .sum()
    }

    /// Number of rows that [`Self::clear_lines`] would remove right now.
    #[must_use]
    pub fn full_row_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.is_full(self.width))
            .count()
    }

    /// Creates a grid from ASCII art for testing.
    ///
    /// `#` is a filled cell and `.` an empty one. Every art row must be `width` cells wide; the
    /// art is aligned to the bottom of the grid, so the last line describes row `height - 1`.
    #[must_use]
    pub fn from_ascii(width: usize, height: usize, art: &str) -> Self {
        let mut grid = Self::new(width, height);
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= height,
            "art has {} rows, grid only {height}",
            lines.len()
        );

        let top = height - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                cells.len(),
                width,
                "Each row must have exactly {width} cells, got {} at row {i}",
                cells.len()
            );
            for (x, &ch) in cells.iter().enumerate() {
                if ch == '#' {
                    grid.rows[top + i].fill_cell(x);
                }
            }
        }
        grid
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = format!("+{}+", "-".repeat(self.width));
        writeln!(f, "{border}")?;
        for row in &self.rows {
            let line: String = row
                .cells(self.width)
                .map(|filled| if filled { '█' } else { ' ' })
                .collect();
            writeln!(f, "|{line}|")?;
        }
        write!(f, "{border}")
    }
}
