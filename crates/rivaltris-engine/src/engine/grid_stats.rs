use serde::{Deserialize, Serialize};

/// Score values for line clears.
///
/// Index corresponds to number of lines cleared simultaneously:
/// - 0 lines: 0 points
/// - 1 line: 100 points
/// - 2 lines: 300 points
/// - 3 lines: 500 points
/// - 4 lines: 800 points
///
/// Any other count scores `count × 100`.
const SCORE_TABLE: [usize; 5] = [0, 100, 300, 500, 800];

/// Points awarded for clearing `lines` rows at once.
#[must_use]
pub fn line_clear_score(lines: usize) -> usize {
    SCORE_TABLE.get(lines).copied().unwrap_or(lines * 100)
}

/// Cumulative statistics for one grid.
///
/// - **Score**: points earned from line clears
/// - **Total cleared lines**: sum of every clear
/// - **Completed pieces**: pieces committed with [`Grid::try_place`](crate::Grid::try_place)
/// - **Line clear distribution**: how many clears removed 0, 1, 2, 3 or 4 rows
///
/// # Example
///
/// ```
/// use rivaltris_engine::GridStats;
///
/// let mut stats = GridStats::new();
/// stats.record_line_clear(4);
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridStats {
    score: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl Default for GridStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GridStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of line clears by count.
    ///
    /// Array indices represent:
    /// - `[0]`: clears that removed nothing
    /// - `[1]`: singles
    /// - `[2]`: doubles
    /// - `[3]`: triples
    /// - `[4]`: quadruples
    ///
    /// Clears of more than four rows are only reflected in the totals.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    pub const fn complete_piece(&mut self) {
        self.completed_pieces += 1;
    }

    /// Records the result of one [`Grid::clear_lines`](crate::Grid::clear_lines) call.
    pub fn record_line_clear(&mut self, cleared_lines: usize) {
        if let Some(counter) = self.line_cleared_counter.get_mut(cleared_lines) {
            *counter += 1;
        }
        if cleared_lines == 0 {
            return;
        }
        self.total_cleared_lines += cleared_lines;
        self.score += line_clear_score(cleared_lines);
    }
}
