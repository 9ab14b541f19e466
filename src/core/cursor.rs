//! Cursor position and saved state
//!
//! Positions are 1-based, matching the escape-sequence addressing: the top
//! left cell is `(1, 1)`.

use super::pen::Pen;

/// Cursor position, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Column (1-based)
    pub col: usize,
    /// Row (1-based)
    pub row: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self::HOME
    }
}

impl Position {
    /// Top left cell
    pub const HOME: Position = Position { col: 1, row: 1 };

    /// Create a position, raising zero coordinates to 1
    pub fn new(col: usize, row: usize) -> Self {
        Self {
            col: col.max(1),
            row: row.max(1),
        }
    }

    /// Carriage return - move to column 1
    pub fn carriage_return(&mut self) {
        self.col = 1;
    }

    /// Zero-based (column, row) indices
    pub(crate) fn index(&self) -> (usize, usize) {
        (self.col.saturating_sub(1), self.row.saturating_sub(1))
    }
}

/// Single-slot saved cursor: position and pen (CSI s / CSI u)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SavedCursor {
    pub position: Position,
    pub pen: Pen,
}

impl SavedCursor {
    /// Capture the current position and pen
    pub fn save(position: Position, pen: Pen) -> Self {
        Self { position, pen }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color;

    #[test]
    fn test_position_default() {
        let pos = Position::default();
        assert_eq!(pos, Position { col: 1, row: 1 });
        assert_eq!(pos.index(), (0, 0));
    }

    #[test]
    fn test_position_new_raises_zero() {
        assert_eq!(Position::new(0, 0), Position::HOME);
        assert_eq!(Position::new(5, 0), Position { col: 5, row: 1 });
    }

    #[test]
    fn test_carriage_return() {
        let mut pos = Position::new(40, 7);
        pos.carriage_return();
        assert_eq!(pos, Position::new(1, 7));
    }

    #[test]
    fn test_saved_cursor_default() {
        let saved = SavedCursor::default();
        assert_eq!(saved.position, Position::HOME);
        assert!(saved.pen.is_default());

        let mut pen = Pen::new();
        pen.fg = Color::Classic(Color::CYAN);
        let saved = SavedCursor::save(Position::new(3, 4), pen);
        assert_eq!(saved.position, Position::new(3, 4));
        assert_eq!(saved.pen.fg, Color::Classic(Color::CYAN));
    }
}
