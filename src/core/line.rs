//! Screen line representation
//!
//! A line is one row of cells, always exactly as wide as the screen.

use super::cell::Cell;

/// A row of cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    cells: Vec<Cell>,
}

impl Line {
    /// Create a blank line with the specified number of columns
    pub fn new(cols: usize) -> Self {
        Self {
            cells: vec![Cell::default(); cols],
        }
    }

    /// Get the number of columns in this line
    pub fn cols(&self) -> usize {
        self.cells.len()
    }

    /// Get a reference to a cell at the given column (0-indexed)
    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    /// Get a mutable reference to a cell at the given column (0-indexed)
    pub fn cell_mut(&mut self, col: usize) -> Option<&mut Cell> {
        self.cells.get_mut(col)
    }

    /// Get all cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Clear cells in `[start, end)`, clamped to the line
    pub fn clear_range(&mut self, start: usize, end: usize) {
        let end = end.min(self.cells.len());
        if start >= end {
            return;
        }
        for cell in &mut self.cells[start..end] {
            cell.clear();
        }
    }

    /// Clear the whole line
    pub fn clear(&mut self) {
        self.clear_range(0, self.cells.len());
    }

    /// Check if every cell is blank with default attributes
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| *c == Cell::default())
    }

    /// Get the glyphs as a string, trailing blanks trimmed
    pub fn text(&self) -> String {
        let s: String = self.cells.iter().map(Cell::glyph).collect();
        s.trim_end().to_string()
    }
}
