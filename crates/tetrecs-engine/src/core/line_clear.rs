use serde::Serialize;

use super::grid::{Cell, CellPos, Grid};

/// Outcome of scanning the grid for full lines after a placement.
///
/// Rows and columns are both lines. A cell lying on a full row and a full column is
/// cleared (and counted) once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineClear {
    full_rows: Vec<usize>,
    full_cols: Vec<usize>,
    cells: Vec<CellPos>,
}

impl LineClear {
    /// Indices of the full rows, top to bottom.
    #[must_use]
    pub fn full_rows(&self) -> &[usize] {
        &self.full_rows
    }

    /// Indices of the full columns, left to right.
    #[must_use]
    pub fn full_cols(&self) -> &[usize] {
        &self.full_cols
    }

    /// Cleared cells in row-major order, without duplicates.
    #[must_use]
    pub fn cells(&self) -> &[CellPos] {
        &self.cells
    }

    /// Full rows plus full columns.
    #[must_use]
    pub fn lines_cleared(&self) -> usize {
        self.full_rows.len() + self.full_cols.len()
    }

    /// Size of the union of all cleared lines.
    #[must_use]
    pub fn blocks_cleared(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines_cleared() == 0
    }
}

/// Finds every full row and column without modifying the grid.
#[must_use]
pub fn find_full_lines(grid: &Grid) -> LineClear {
    let full_rows: Vec<usize> = (0..grid.rows()).filter(|&y| grid.is_row_full(y)).collect();
    let full_cols: Vec<usize> = (0..grid.cols()).filter(|&x| grid.is_col_full(x)).collect();

    let mut cells = Vec::new();
    if !full_rows.is_empty() || !full_cols.is_empty() {
        for y in 0..grid.rows() {
            let row_full = full_rows.contains(&y);
            for x in 0..grid.cols() {
                if row_full || full_cols.contains(&x) {
                    cells.push(CellPos::new(x, y));
                }
            }
        }
    }

    LineClear {
        full_rows,
        full_cols,
        cells,
    }
}

/// Clears every full row and column, resetting their cells to empty.
///
/// Nothing shifts: cells outside the cleared lines keep their positions.
///
/// # Example
///
/// ```
/// use tetrecs_engine::{Grid, Piece, PieceKind, clear_full_lines};
///
/// let mut grid = Grid::new(3, 3);
/// grid.place(&Piece::new(PieceKind::Line), 1, 1);
///
/// let cleared = clear_full_lines(&mut grid);
/// assert_eq!(cleared.lines_cleared(), 1);
/// assert_eq!(cleared.blocks_cleared(), 3);
/// assert_eq!(grid.occupied_count(), 0);
/// ```
pub fn clear_full_lines(grid: &mut Grid) -> LineClear {
    let cleared = find_full_lines(grid);
    for pos in &cleared.cells {
        grid.set(pos.x, pos.y, Cell::Empty);
    }
    cleared
}

#[cfg(test)]
mod tests {
    use crate::core::piece::PieceKind;

    use super::*;

    fn fill_row(grid: &mut Grid, y: usize, kind: PieceKind) {
        for x in 0..grid.cols() {
            grid.set(x, y, Cell::Block(kind));
        }
    }

    fn fill_col(grid: &mut Grid, x: usize, kind: PieceKind) {
        for y in 0..grid.rows() {
            grid.set(x, y, Cell::Block(kind));
        }
    }

    #[test]
    fn test_empty_grid_clears_nothing() {
        let mut grid = Grid::new(5, 5);
        let cleared = clear_full_lines(&mut grid);
        assert!(cleared.is_empty());
        assert_eq!(cleared.blocks_cleared(), 0);
    }

    #[test]
    fn test_full_row_is_cleared_and_rest_untouched() {
        let mut grid = Grid::new(5, 5);
        fill_row(&mut grid, 3, PieceKind::T);
        grid.set(0, 0, Cell::Block(PieceKind::Dot));
        grid.set(4, 4, Cell::Block(PieceKind::Dot));

        let cleared = clear_full_lines(&mut grid);

        assert_eq!(cleared.full_rows(), &[3]);
        assert!(cleared.full_cols().is_empty());
        assert_eq!(cleared.lines_cleared(), 1);
        assert_eq!(cleared.blocks_cleared(), 5);
        for x in 0..5 {
            assert_eq!(grid.get(x, 3), Some(Cell::Empty));
        }
        assert_eq!(grid.get(0, 0), Some(Cell::Block(PieceKind::Dot)));
        assert_eq!(grid.get(4, 4), Some(Cell::Block(PieceKind::Dot)));
    }

    #[test]
    fn test_row_and_column_intersection_counted_once() {
        let mut grid = Grid::new(5, 5);
        fill_row(&mut grid, 1, PieceKind::Line);
        fill_col(&mut grid, 2, PieceKind::Line);
        fill_row(&mut grid, 4, PieceKind::Line);

        let cleared = clear_full_lines(&mut grid);

        assert_eq!(cleared.full_rows(), &[1, 4]);
        assert_eq!(cleared.full_cols(), &[2]);
        assert_eq!(cleared.lines_cleared(), 3);
        // 5 + 5 + 5 minus the two shared cells
        assert_eq!(cleared.blocks_cleared(), 13);
        assert_eq!(grid.occupied_count(), 0);

        let mut unique = cleared.cells().to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), cleared.cells().len());
    }

    #[test]
    fn test_cursor_marker_blocks_a_line() {
        let mut grid = Grid::new(4, 4);
        fill_row(&mut grid, 0, PieceKind::S);
        grid.set(2, 0, Cell::Cursor);

        let cleared = clear_full_lines(&mut grid);
        assert!(cleared.is_empty());
        assert_eq!(grid.get(2, 0), Some(Cell::Cursor));
        assert_eq!(grid.occupied_count(), 3);
    }

    #[test]
    fn test_full_grid_clears_everything() {
        let mut grid = Grid::new(3, 3);
        for y in 0..3 {
            fill_row(&mut grid, y, PieceKind::X);
        }

        let cleared = clear_full_lines(&mut grid);
        assert_eq!(cleared.lines_cleared(), 6);
        assert_eq!(cleared.blocks_cleared(), 9);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_find_full_lines_does_not_mutate() {
        let mut grid = Grid::new(3, 3);
        fill_col(&mut grid, 0, PieceKind::C);
        let before = grid.clone();

        let found = find_full_lines(&grid);
        assert_eq!(found.full_cols(), &[0]);
        assert_eq!(
            found.cells(),
            &[CellPos::new(0, 0), CellPos::new(0, 1), CellPos::new(0, 2)]
        );
        assert_eq!(grid, before);
    }
}
