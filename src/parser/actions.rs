//! Commands produced by the parser
//!
//! These represent the validated, normalized meaning of an escape sequence.
//! Parameters are already defaulted and range-checked, so the converter can
//! apply them without further checks.

use serde::{Deserialize, Serialize};

use crate::core::LineErase;

/// Direction of a relative cursor motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// CSI A
    Up,
    /// CSI B
    Down,
    /// CSI C
    Forward,
    /// CSI D
    Back,
}

impl Direction {
    /// Column and row offsets for moving `n` cells this way
    pub fn delta(self, n: usize) -> (isize, isize) {
        let n = isize::try_from(n).unwrap_or(isize::MAX);
        match self {
            Direction::Up => (0, -n),
            Direction::Down => (0, n),
            Direction::Forward => (n, 0),
            Direction::Back => (-n, 0),
        }
    }
}

/// Erase-in-display extent (CSI J)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayErase {
    /// 0: cursor to end of screen
    ToEnd,
    /// 1: start of screen through cursor
    ToStart,
    /// 2: whole screen, cursor homed
    All,
    /// 3: whole screen including scrollback, cursor kept
    Scrollback,
}

/// Validated escape sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParsedCommand {
    /// Relative cursor motion (CUU/CUD/CUF/CUB), amount >= 1
    Move(Direction, usize),
    /// Absolute cursor position (CUP/HVP), both >= 1
    SetPosition { row: usize, col: usize },
    /// Erase in display (ED)
    EraseDisplay(DisplayErase),
    /// Erase in line (EL)
    EraseLine(LineErase),
    /// Save cursor position and pen (CSI s)
    SaveCursor,
    /// Restore cursor position and pen (CSI u)
    RestoreCursor,
    /// Select graphic rendition (SGR), codes in 0..=255
    GraphicRendition(Vec<u16>),
    /// Recognized but has no effect on a static render
    Ignored(u8),
    /// Recognized and well formed, but there is nothing to dispatch it to
    Unhandled(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Up.delta(3), (0, -3));
        assert_eq!(Direction::Down.delta(2), (0, 2));
        assert_eq!(Direction::Forward.delta(5), (5, 0));
        assert_eq!(Direction::Back.delta(1), (-1, 0));
        assert_eq!(Direction::Forward.delta(usize::MAX), (isize::MAX, 0));
    }

    #[test]
    fn test_command_serialization() {
        let command = ParsedCommand::SetPosition { row: 10, col: 20 };
        let json = serde_json::to_string(&command).unwrap();
        let restored: ParsedCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(command, restored);
    }
}
