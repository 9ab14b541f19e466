//! Screen cell
//!
//! A single character position: an optional glyph plus a snapshot of the
//! pen that was active when it was written.

use super::pen::Pen;

/// A single cell in the screen grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    /// The glyph in this cell, `None` for blank
    pub ch: Option<char>,
    /// Attributes copied from the pen at write time
    pub pen: Pen,
}

impl Cell {
    /// Create a cell holding `ch` drawn with `pen`.
    ///
    /// A space is stored as blank.
    pub fn new(ch: char, pen: Pen) -> Self {
        Self {
            ch: (ch != ' ').then_some(ch),
            pen,
        }
    }

    /// Check if this cell has no glyph
    pub fn is_blank(&self) -> bool {
        self.ch.is_none()
    }

    /// The character to output for this cell
    pub fn glyph(&self) -> char {
        self.ch.unwrap_or(' ')
    }

    /// Reset to blank with default attributes
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
