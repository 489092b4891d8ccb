//! Layout data types

use crate::types::PixelSize;

/// Top-left corner of a cell on the sheet, in pixels from the top-left of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    pub x: u32,
    pub y: u32,
}

impl CellPosition {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Position within the grid (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    /// Row index (0 = top row)
    pub row: usize,
    /// Column index (0 = leftmost column)
    pub col: usize,
}

impl GridPosition {
    /// Row-major position of cell `index` in a grid `cols` wide
    pub fn from_index(index: usize, cols: usize) -> Self {
        Self {
            row: index / cols,
            col: index % cols,
        }
    }
}

/// Card grid on one sheet
///
/// Every sheet of a run shares the same grid; a partial batch uses the first
/// cells and leaves the rest blank.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub page: PixelSize,
    pub card: PixelSize,
    pub rows: usize,
    pub cols: usize,
    pub margin: u32,
    /// Space between adjacent columns
    pub h_gap: u32,
    /// Space between adjacent rows
    pub v_gap: u32,
    /// Cell corners in row-major order, `rows * cols` entries
    pub cells: Vec<CellPosition>,
}

impl GridLayout {
    /// Total number of cells in the grid
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }
}
