use arrayvec::ArrayVec;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::PlacementError;

use super::piece::{FOOTPRINT_SIZE, Piece, PieceKind};

/// Integer encoding of [`Cell::Cursor`] used by external collaborators.
pub const CURSOR_MARKER: u8 = 16;

/// Grid cells covered by one placement (at most one per footprint cell).
pub type CoveredCells = ArrayVec<CellPos, { FOOTPRINT_SIZE * FOOTPRINT_SIZE }>;

/// A single cell of the grid.
///
/// `Cursor` is a transient highlight for keyboard play. It is never real occupancy:
/// placement treats it as empty and line clearing treats it as not full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::IsVariant)]
pub enum Cell {
    #[default]
    Empty,
    Block(PieceKind),
    Cursor,
}

impl Cell {
    /// Integer value seen by renderers: `0` empty, `1..=15` colour, `16` cursor.
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Block(kind) => kind.colour(),
            Cell::Cursor => CURSOR_MARKER,
        }
    }

    #[must_use]
    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Cell::Empty),
            CURSOR_MARKER => Some(Cell::Cursor),
            _ => match PieceKind::from_colour(value) {
                Some(kind) => Some(Cell::Block(kind)),
                None => None,
            },
        }
    }

    /// Returns whether the cell holds a colour identifier.
    #[must_use]
    pub const fn is_occupied(self) -> bool {
        matches!(self, Cell::Block(_))
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.value())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Cell::from_value(value)
            .ok_or_else(|| de::Error::custom(format!("invalid cell value: {value}")))
    }
}

/// A `(column, row)` position on the grid. `(0, 0)` is the top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub x: usize,
    pub y: usize,
}

impl CellPos {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// The board: a fixed-size grid of cells stored row-major.
///
/// Pieces are anchored on their footprint centre: footprint cell `(j, i)` lands on
/// grid cell `(x + j - 1, y + i - 1)`.
///
/// # Example
///
/// ```
/// use tetrecs_engine::{Cell, Grid, Piece, PieceKind};
///
/// let mut grid = Grid::new(5, 5);
/// let plus = Piece::new(PieceKind::Plus);
///
/// assert!(!grid.can_place(&plus, 0, 0)); // would hang off the top-left edge
/// assert!(grid.can_place(&plus, 1, 1));
///
/// grid.place(&plus, 1, 1);
/// assert_eq!(grid.get(1, 1), Some(Cell::Block(PieceKind::Plus)));
/// assert!(!grid.can_place(&plus, 2, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an empty grid.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    pub fn new(cols: usize, rows: usize) -> Self {
        assert!(cols > 0 && rows > 0, "grid must be at least 1x1");
        Self {
            cols,
            rows,
            cells: vec![Cell::Empty; cols * rows],
        }
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        self.contains(x, y).then(|| y * self.cols + x)
    }

    #[must_use]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.cols && y < self.rows
    }

    /// Returns the cell at `(x, y)`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Sets the cell at `(x, y)`. Returns `false` if out of bounds.
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterates over the rows from top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(self.cols)
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// Number of cells holding a colour identifier.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    /// A row is full when every cell holds a colour identifier.
    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        y < self.rows && (0..self.cols).all(|x| self.cells[y * self.cols + x].is_occupied())
    }

    /// A column is full when every cell holds a colour identifier.
    #[must_use]
    pub fn is_col_full(&self, x: usize) -> bool {
        x < self.cols && (0..self.rows).all(|y| self.cells[y * self.cols + x].is_occupied())
    }

    /// Maps the occupied footprint cells of `piece` anchored at `(x, y)` onto grid positions.
    ///
    /// Fails with [`PlacementError::OutOfBounds`] if any of them falls outside the grid;
    /// pieces never clip at the edges.
    pub fn covered_cells(
        &self,
        piece: &Piece,
        x: usize,
        y: usize,
    ) -> Result<CoveredCells, PlacementError> {
        let mut covered = CoveredCells::new();
        for (dx, dy) in piece.occupied_offsets() {
            let cx = x.checked_add(dx).and_then(|v| v.checked_sub(1));
            let cy = y.checked_add(dy).and_then(|v| v.checked_sub(1));
            let (Some(cx), Some(cy)) = (cx, cy) else {
                return Err(PlacementError::OutOfBounds);
            };
            if !self.contains(cx, cy) {
                return Err(PlacementError::OutOfBounds);
            }
            covered.push(CellPos::new(cx, cy));
        }
        Ok(covered)
    }

    /// Checks whether `piece` fits at `(x, y)` without overlap or leaving the grid.
    ///
    /// Cursor markers count as empty.
    pub fn check_placement(&self, piece: &Piece, x: usize, y: usize) -> Result<(), PlacementError> {
        let covered = self.covered_cells(piece, x, y)?;
        if covered
            .iter()
            .any(|pos| self.cells[pos.y * self.cols + pos.x].is_occupied())
        {
            return Err(PlacementError::Occupied);
        }
        Ok(())
    }

    #[must_use]
    pub fn can_place(&self, piece: &Piece, x: usize, y: usize) -> bool {
        self.check_placement(piece, x, y).is_ok()
    }

    /// Writes the piece's colour into every covered cell.
    ///
    /// Only call after [`Self::can_place`] succeeded: occupancy is not checked. A footprint
    /// leaving the grid is dropped as a whole, so the grid is never partially written.
    pub fn place(&mut self, piece: &Piece, x: usize, y: usize) {
        let Ok(covered) = self.covered_cells(piece, x, y) else {
            return;
        };
        for pos in covered {
            self.cells[pos.y * self.cols + pos.x] = Cell::Block(piece.kind());
        }
    }

    /// Moves the cursor marker to `pos`.
    ///
    /// Any previous marker is removed. The marker is only drawn on an empty cell.
    pub fn mark_cursor(&mut self, pos: CellPos) {
        self.clear_cursor();
        if let Some(i) = self.index(pos.x, pos.y)
            && self.cells[i].is_empty()
        {
            self.cells[i] = Cell::Cursor;
        }
    }

    /// Removes every cursor marker.
    pub fn clear_cursor(&mut self) {
        for cell in &mut self.cells {
            if cell.is_cursor() {
                *cell = Cell::Empty;
            }
        }
    }
}
