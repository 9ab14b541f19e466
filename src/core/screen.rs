//! Virtual screen
//!
//! A fixed-width grid whose height grows on demand. Rows are only ever
//! appended: writing to or positioning onto a row past the bottom extends
//! the grid, while relative cursor motion and erase operations stay inside
//! the rows that already exist.
//!
//! Once the input is consumed the screen is serialized row by row into
//! UTF-8 text with SGR escapes, emitting an escape only where the
//! attributes change.

use std::io::{self, Write};
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::cursor::Position;
use super::line::Line;
use super::pen::{EscapeOptions, Pen};

/// Attribute reset written at both ends of every output row
pub const RESET: &str = "\x1b[0m";

/// Erase-in-line extent (CSI K)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineErase {
    /// From the cursor to the end of the line
    ToEnd,
    /// From the start of the line through the cursor
    ToStart,
    /// The whole line
    All,
}

/// Which attributes the first cell of a row is diffed against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaselinePolicy {
    /// Every row starts from default attributes and renders its first cell in full
    #[default]
    ResetPerRow,
    /// Only the first cell of the document is rendered in full; row starts
    /// are diffed against the last cell of the previous row.
    ///
    /// Every row still opens with `ESC[0m`, so a row whose first cell has
    /// the same attributes as the previous row's last cell is printed in the
    /// terminal's own default colors until the next change.
    CarryAcrossRows,
}

/// Serialization settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Per-row budget for escapes and glyphs, 0 = unlimited
    pub max_bytes_per_row: usize,
    /// Prefix rows with their number and end them with `|`
    pub number_rows: bool,
    pub baseline: BaselinePolicy,
    pub escapes: EscapeOptions,
}

/// Rejected cell write
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("bad position {col}, {row}")]
    Zero { col: usize, row: usize },
    #[error("position {col}, {row} exceeds column width {width}")]
    BeyondWidth { col: usize, row: usize, width: usize },
}

/// The screen grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    width: usize,
    lines: Vec<Line>,
}

impl Screen {
    /// Create a screen one row high
    pub fn new(width: NonZeroUsize) -> Self {
        Self {
            width: width.get(),
            lines: vec![Line::new(width.get())],
        }
    }

    /// Get the number of columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the number of rows
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Get a row (1-based)
    pub fn line(&self, row: usize) -> Option<&Line> {
        row.checked_sub(1).and_then(|i| self.lines.get(i))
    }

    /// Get all rows
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Get the cell at a position
    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        let (col, row) = pos.index();
        if pos.col == 0 || pos.row == 0 {
            return None;
        }
        self.lines.get(row).and_then(|line| line.cell(col))
    }

    /// Grow the grid so that `row` (1-based) exists
    pub fn touch(&mut self, row: usize) {
        if row > self.lines.len() {
            let width = self.width;
            self.lines.resize_with(row, || Line::new(width));
        }
    }

    /// Write a glyph, growing the grid down to `pos.row`
    pub fn put(&mut self, pos: Position, ch: char, pen: Pen) -> Result<(), PositionError> {
        if pos.col == 0 || pos.row == 0 {
            return Err(PositionError::Zero {
                col: pos.col,
                row: pos.row,
            });
        }
        if pos.col > self.width {
            return Err(PositionError::BeyondWidth {
                col: pos.col,
                row: pos.row,
                width: self.width,
            });
        }

        self.touch(pos.row);
        let (col, row) = pos.index();
        if let Some(cell) = self.lines[row].cell_mut(col) {
            *cell = Cell::new(ch, pen);
        }
        Ok(())
    }

    /// Move by `(dx, dy)`, clamping to the existing grid. Never grows.
    pub fn move_relative(&self, pos: &mut Position, dx: isize, dy: isize) {
        pos.col = clamp_offset(pos.col, dx, self.width);
        pos.row = clamp_offset(pos.row, dy, self.height());
    }

    /// Jump to `(col, row)`, growing the grid to cover `row`
    pub fn set_absolute(&mut self, pos: &mut Position, row: usize, col: usize) {
        *pos = Position::new(col, row);
        self.touch(pos.row);
    }

    /// The position one cell after `pos` in row-major order
    pub fn next_position(&self, pos: Position) -> Position {
        let (col, row) = pos.index();
        let address = row
            .saturating_mul(self.width)
            .saturating_add(col)
            .saturating_add(1);
        Position {
            col: address % self.width + 1,
            row: address / self.width + 1,
        }
    }

    /// Advance one cell, wrapping at the right edge and growing as needed.
    ///
    /// The row is clamped to `max_rows` (0 = unlimited); when that happens
    /// the unclamped row is returned.
    pub fn advance(&mut self, pos: &mut Position, max_rows: usize) -> Option<usize> {
        *pos = self.next_position(*pos);
        let clamped = (max_rows > 0 && pos.row > max_rows).then(|| {
            let row = pos.row;
            pos.row = max_rows;
            row
        });
        self.touch(pos.row);
        clamped
    }

    /// Clear from the cursor to the end of the screen
    pub fn erase_to_end(&mut self, pos: Position) {
        let (col, row) = pos.index();
        for (i, line) in self.lines.iter_mut().enumerate().skip(row) {
            if i == row {
                line.clear_range(col, usize::MAX);
            } else {
                line.clear();
            }
        }
    }

    /// Clear from the start of the screen through the cursor
    pub fn erase_to_start(&mut self, pos: Position) {
        let (col, row) = pos.index();
        for (i, line) in self.lines.iter_mut().enumerate().take(row.saturating_add(1)) {
            if i == row {
                line.clear_range(0, col.saturating_add(1));
            } else {
                line.clear();
            }
        }
    }

    /// Clear part or all of the cursor's row
    pub fn erase_line(&mut self, pos: Position, mode: LineErase) {
        let (col, row) = pos.index();
        let Some(line) = self.lines.get_mut(row) else {
            return;
        };
        match mode {
            LineErase::ToEnd => line.clear_range(col, usize::MAX),
            LineErase::ToStart => line.clear_range(0, col.saturating_add(1)),
            LineErase::All => line.clear(),
        }
    }

    /// Clear every existing row
    pub fn erase_all(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
    }

    /// Write every row to `out`.
    ///
    /// Each row is framed by attribute resets and terminated by `\n`.
    /// Escapes and glyphs count against `max_bytes_per_row`; the first piece
    /// that does not fit ends the row's content, but the framing is always
    /// written.
    pub fn serialize<W: Write>(&self, out: &mut W, options: &RenderOptions) -> io::Result<()> {
        let mut baseline = Pen::default();
        let mut full_render = true;

        for (index, line) in self.lines.iter().enumerate() {
            out.write_all(RESET.as_bytes())?;
            if options.number_rows {
                write!(out, "{:5}: ", index + 1)?;
            }

            if options.baseline == BaselinePolicy::ResetPerRow {
                baseline = Pen::default();
                full_render = true;
            }

            let mut budget = RowBudget::new(options.max_bytes_per_row);
            let mut glyph_buf = [0u8; 4];
            for cell in line.cells() {
                let escape = cell.pen.render(&baseline, !full_render, options.escapes);
                full_render = false;
                baseline = cell.pen;

                if !escape.is_empty() {
                    if !budget.take(escape.len()) {
                        break;
                    }
                    out.write_all(escape.as_bytes())?;
                }

                let glyph = cell.glyph().encode_utf8(&mut glyph_buf);
                if !budget.take(glyph.len()) {
                    break;
                }
                out.write_all(glyph.as_bytes())?;
            }

            out.write_all(RESET.as_bytes())?;
            if options.number_rows {
                out.write_all(b"|")?;
            }
            out.write_all(b"\n")?;
        }

        Ok(())
    }

    /// Serialize into a string
    pub fn render_to_string(&self, options: &RenderOptions) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.serialize(&mut buf, options);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Per-row output byte counter
struct RowBudget {
    limit: usize,
    used: usize,
}

impl RowBudget {
    fn new(limit: usize) -> Self {
        Self { limit, used: 0 }
    }

    /// Reserve `n` bytes, returning false if they do not fit
    fn take(&mut self, n: usize) -> bool {
        if self.limit > 0 && self.used + n > self.limit {
            return false;
        }
        self.used += n;
        true
    }
}

/// `value + delta`, clamped to `[1, max]`
fn clamp_offset(value: usize, delta: isize, max: usize) -> usize {
    let moved = if delta < 0 {
        value.saturating_sub(delta.unsigned_abs())
    } else {
        value.saturating_add(delta.unsigned_abs())
    };
    moved.clamp(1, max.max(1))
}
