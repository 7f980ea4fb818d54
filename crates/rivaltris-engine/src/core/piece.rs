use std::{fmt, str::FromStr};

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// A falling-block piece: a kind plus its current occupancy matrix.
///
/// Pieces are created fresh for every turn with [`Piece::new`] and then rotated up to three
/// times before being committed to a [`Grid`](super::grid::Grid).
///
/// # Coordinate System
///
/// - The occupancy matrix is addressed as `(col, row)`
/// - `(0, 0)` is the top-left cell of the piece's bounding box
/// - Rows grow downward, matching the grid
///
/// # Example
///
/// ```
/// use rivaltris_engine::{Piece, PieceKind};
///
/// let mut piece = Piece::new(PieceKind::I);
/// assert_eq!((piece.width(), piece.height()), (4, 1));
///
/// piece.rotate();
/// assert_eq!((piece.width(), piece.height()), (1, 4));
/// assert_eq!(piece.rotation().as_u8(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    shape: PieceShape,
    rotation: PieceRotation,
}

impl Piece {
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: kind.canonical_shape(),
            rotation: PieceRotation::default(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn shape(&self) -> &PieceShape {
        &self.shape
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.shape.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.shape.height()
    }

    /// Rotates the piece 90° clockwise in place.
    ///
    /// The matrix is replaced by the transpose of its row-reversed form. The transform is
    /// applied mechanically even for kinds whose visual period is shorter than four (O, I, S, Z).
    pub fn rotate(&mut self) {
        self.shape = self.shape.rotated_clockwise();
        self.rotation = self.rotation.rotated_right();
    }

    /// Returns a copy of this piece rotated clockwise `times` times.
    #[must_use]
    pub fn rotated_by(mut self, times: u8) -> Self {
        for _ in 0..times {
            self.rotate();
        }
        self
    }

    /// Returns an iterator of `(col, row)` offsets of the filled cells.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.shape.occupied_cells()
    }
}

/// Rotation state of a piece, counted in clockwise quarter turns.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise
///
/// Rotation wraps around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PieceRotation(u8);

impl PieceRotation {
    #[must_use]
    pub fn rotated_right(self) -> Self {
        PieceRotation((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Builds a rotation from a quarter-turn count, wrapping modulo 4.
    #[must_use]
    pub const fn from_turns(turns: u8) -> Self {
        PieceRotation(turns % 4)
    }
}

impl<'de> Deserialize<'de> for PieceRotation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let turns = u8::deserialize(deserializer)?;
        if turns > 3 {
            return Err(serde::de::Error::custom(format!(
                "rotation must be 0-3, got {turns}"
            )));
        }
        Ok(PieceRotation(turns))
    }
}

/// Occupancy matrix of a piece, at most 4×4.
///
/// `cells[row][col]` is `true` for filled cells. Only the `height × width` top-left region is
/// meaningful; the rest stays `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceShape {
    width: u8,
    height: u8,
    cells: [[bool; 4]; 4],
}

impl PieceShape {
    const fn from_rows(width: u8, height: u8, rows: [[u8; 4]; 4]) -> Self {
        let mut cells = [[false; 4]; 4];
        let mut y = 0;
        while y < 4 {
            let mut x = 0;
            while x < 4 {
                cells[y][x] = rows[y][x] != 0;
                x += 1;
            }
            y += 1;
        }
        Self {
            width,
            height,
            cells,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        usize::from(self.width)
    }

    #[must_use]
    pub fn height(&self) -> usize {
        usize::from(self.height)
    }

    /// Returns whether the cell at `(col, row)` of the bounding box is filled.
    #[must_use]
    pub fn is_filled(&self, col: usize, row: usize) -> bool {
        col < self.width() && row < self.height() && self.cells[row][col]
    }

    /// Returns the 90° clockwise transform: the transpose of the row-reversed matrix.
    #[must_use]
    pub fn rotated_clockwise(&self) -> Self {
        let (w, h) = (self.width(), self.height());
        let mut cells = [[false; 4]; 4];
        for (row, new_row) in cells.iter_mut().enumerate().take(w) {
            for (col, cell) in new_row.iter_mut().enumerate().take(h) {
                *cell = self.cells[h - 1 - col][row];
            }
        }
        Self {
            width: self.height,
            height: self.width,
            cells,
        }
    }

    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height()).flat_map(move |row| {
            (0..self.width()).filter_map(move |col| self.cells[row][col].then_some((col, row)))
        })
    }
}

/// The seven canonical piece kinds.
///
/// Declaration order is the canonical order `I, O, T, S, Z, L, J`; every ordered listing of
/// kinds (pool availability, snapshots, logs) follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// L-piece.
    L = 5,
    /// J-piece.
    J = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece kinds (7).
    pub const LEN: usize = 7;

    /// All kinds in canonical order.
    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::L,
        PieceKind::J,
    ];

    /// Position of this kind in the canonical order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn canonical_shape(self) -> PieceShape {
        CANONICAL_SHAPES[self.index()]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// ```
    /// use rivaltris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::J.as_char(), 'J');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::L => 'L',
            PieceKind::J => 'J',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// ```
    /// use rivaltris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('T'), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'L' => Some(PieceKind::L),
            'J' => Some(PieceKind::J),
            _ => None,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid piece kind: {input:?} (expected one of I, O, T, S, Z, L, J)")]
pub struct ParsePieceKindError {
    input: String,
}

impl FromStr for PieceKind {
    type Err = ParsePieceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => PieceKind::from_char(c.to_ascii_uppercase()),
            _ => None,
        }
        .ok_or_else(|| ParsePieceKindError {
            input: s.to_owned(),
        })
    }
}

impl Serialize for PieceKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_char(self.as_char())
    }
}

impl<'de> Deserialize<'de> for PieceKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

const CANONICAL_SHAPES: [PieceShape; PieceKind::LEN] = {
    const E: [u8; 4] = [0; 4];
    [
        // I-piece
        PieceShape::from_rows(4, 1, [[1, 1, 1, 1], E, E, E]),
        // O-piece
        PieceShape::from_rows(2, 2, [[1, 1, 0, 0], [1, 1, 0, 0], E, E]),
        // T-piece
        PieceShape::from_rows(3, 2, [[0, 1, 0, 0], [1, 1, 1, 0], E, E]),
        // S-piece
        PieceShape::from_rows(3, 2, [[0, 1, 1, 0], [1, 1, 0, 0], E, E]),
        // Z-piece
        PieceShape::from_rows(3, 2, [[1, 1, 0, 0], [0, 1, 1, 0], E, E]),
        // L-piece
        PieceShape::from_rows(2, 3, [[1, 0, 0, 0], [1, 0, 0, 0], [1, 1, 0, 0], E]),
        // J-piece
        PieceShape::from_rows(2, 3, [[0, 1, 0, 0], [0, 1, 0, 0], [1, 1, 0, 0], E]),
    ]
};
