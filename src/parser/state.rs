//! Parser State Machine
//!
//! ANSI art only uses a small slice of ECMA-48: CSI sequences understood by
//! ANSI.SYS plus a few single-letter escapes. The parser therefore has just
//! two states:
//!
//! - Normal: bytes belong to the text stream and are handled by the caller
//! - InEscape: after ESC, collecting parameter text until a terminator
//!
//! Terminators come from a closed alphabet. When one arrives the collected
//! parameter text is validated for that command family and normalized into
//! a [`ParsedCommand`].

use super::actions::{Direction, DisplayErase, ParsedCommand};
use crate::core::LineErase;

/// Every byte that ends an escape sequence
pub const TERMINATORS: &[u8] = b"cfhlmsuABCDEFGHJKNOPSTX\\]^_";

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Normal,
    InEscape,
}

/// Rejected escape sequence
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid code ESC{sequence}: {reason}")]
    Malformed {
        sequence: String,
        reason: &'static str,
    },
    #[error("unknown terminator {byte:#04x} after ESC{sequence}")]
    UnknownTerminator { byte: u8, sequence: String },
}

/// CSI command selected by the terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CsiKind {
    Motion(Direction),
    EraseDisplay,
    EraseLine,
    Position,
    Save,
    Restore,
    Rendition,
}

/// Command family selected by the terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Csi(CsiKind),
    Ignored,
    NonCsi,
}

impl Family {
    fn of(letter: u8) -> Option<Self> {
        Some(match letter {
            b'A' => Family::Csi(CsiKind::Motion(Direction::Up)),
            b'B' => Family::Csi(CsiKind::Motion(Direction::Down)),
            b'C' => Family::Csi(CsiKind::Motion(Direction::Forward)),
            b'D' => Family::Csi(CsiKind::Motion(Direction::Back)),
            b'J' => Family::Csi(CsiKind::EraseDisplay),
            b'K' => Family::Csi(CsiKind::EraseLine),
            b'H' | b'f' => Family::Csi(CsiKind::Position),
            b's' => Family::Csi(CsiKind::Save),
            b'u' => Family::Csi(CsiKind::Restore),
            b'm' => Family::Csi(CsiKind::Rendition),
            // Not in ANSI.SYS, or modes with no effect on a static render
            b'E' | b'F' | b'G' | b'S' | b'T' | b'h' | b'l' => Family::Ignored,
            b'N' | b'O' | b'P' | b'X' | b'\\' | b']' | b'^' | b'_' | b'c' => Family::NonCsi,
            _ => return None,
        })
    }
}

/// A single numeric parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Param {
    Empty,
    Number(u32),
    Invalid,
}

impl Param {
    fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Param::Empty;
        }
        if !text.bytes().all(|b| b.is_ascii_digit()) {
            return Param::Invalid;
        }
        let value = text.bytes().fold(0u32, |acc, b| {
            acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
        });
        Param::Number(value)
    }

    /// The value if it is at least 1, otherwise `default`
    fn positive_or(self, default: usize) -> usize {
        match self {
            Param::Number(n) if n >= 1 => n as usize,
            _ => default,
        }
    }
}

/// The escape sequence parser
#[derive(Debug, Default)]
pub struct Parser {
    state: State,
    /// Parameter text collected since ESC
    params: Vec<u8>,
    /// Treat foreign final bytes as unknown terminators
    strict: bool,
}

impl Parser {
    /// Create a new parser in the normal state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser that rejects final bytes outside the terminator set
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    /// Check if an escape sequence is being collected
    pub fn in_escape(&self) -> bool {
        self.state == State::InEscape
    }

    /// Start a new escape sequence (ESC received)
    pub fn begin(&mut self) {
        self.state = State::InEscape;
        self.params.clear();
    }

    /// Abandon any sequence in progress
    pub fn reset(&mut self) {
        self.state = State::Normal;
        self.params.clear();
    }

    /// Feed one byte of an escape sequence.
    ///
    /// Returns `None` while the sequence is still open, and the validated
    /// command (or the reason it was rejected) once it terminates. Bytes fed
    /// in the normal state are ignored.
    pub fn feed(&mut self, byte: u8) -> Option<Result<ParsedCommand, ParseError>> {
        if self.state != State::InEscape {
            return None;
        }

        match byte {
            0x1B => {
                self.begin();
                None
            }
            0x00..=0x1F => None,
            _ if TERMINATORS.contains(&byte) => {
                self.state = State::Normal;
                Some(validate(byte, &self.params))
            }
            _ if self.strict && self.is_foreign_final(byte) => {
                self.state = State::Normal;
                Some(Err(ParseError::UnknownTerminator {
                    byte,
                    sequence: String::from_utf8_lossy(&self.params).into_owned(),
                }))
            }
            _ => {
                self.params.push(byte);
                None
            }
        }
    }

    /// Parse a complete sequence, starting after the ESC byte
    pub fn parse_sequence(&mut self, bytes: &[u8]) -> Option<Result<ParsedCommand, ParseError>> {
        self.begin();
        for &byte in bytes {
            if let Some(result) = self.feed(byte) {
                return Some(result);
            }
        }
        None
    }

    fn is_foreign_final(&self, byte: u8) -> bool {
        let csi_introducer = byte == b'[' && self.params.is_empty();
        byte >= 0x7F || ((0x40..=0x7E).contains(&byte) && !csi_introducer)
    }
}

/// Validate the parameter text for the command selected by `letter`
fn validate(letter: u8, raw: &[u8]) -> Result<ParsedCommand, ParseError> {
    let text = String::from_utf8_lossy(raw);
    let malformed = |reason: &'static str| ParseError::Malformed {
        sequence: format!("{}{}", text, letter as char),
        reason,
    };

    let Some(family) = Family::of(letter) else {
        return Err(ParseError::UnknownTerminator {
            byte: letter,
            sequence: text.to_string(),
        });
    };

    let trimmed = text.trim();
    let kind = match family {
        Family::Csi(kind) => kind,
        Family::Ignored => return Ok(ParsedCommand::Ignored(letter)),
        Family::NonCsi if trimmed.is_empty() => return Ok(ParsedCommand::Unhandled(letter)),
        Family::NonCsi => return Err(malformed("unexpected parameters")),
    };

    let Some(body) = trimmed.strip_prefix('[') else {
        return Err(malformed("missing '['"));
    };
    let params: Vec<Param> = if body.is_empty() {
        Vec::new()
    } else {
        body.split(';').map(Param::parse).collect()
    };

    match kind {
        CsiKind::Motion(direction) => {
            if params.len() > 1 {
                return Err(malformed("too many parameters"));
            }
            let n = params.first().map_or(1, |p| p.positive_or(1));
            Ok(ParsedCommand::Move(direction, n))
        }
        CsiKind::EraseDisplay => {
            if params.len() > 1 {
                return Err(malformed("too many parameters"));
            }
            let mode = match params.first() {
                Some(Param::Number(1)) => DisplayErase::ToStart,
                Some(Param::Number(2)) => DisplayErase::All,
                Some(Param::Number(3)) => DisplayErase::Scrollback,
                _ => DisplayErase::ToEnd,
            };
            Ok(ParsedCommand::EraseDisplay(mode))
        }
        CsiKind::EraseLine => {
            if params.len() > 1 {
                return Err(malformed("too many parameters"));
            }
            let mode = match params.first() {
                Some(Param::Number(1)) => LineErase::ToStart,
                Some(Param::Number(2)) => LineErase::All,
                _ => LineErase::ToEnd,
            };
            Ok(ParsedCommand::EraseLine(mode))
        }
        CsiKind::Position => {
            if params.len() > 2 {
                return Err(malformed("too many parameters"));
            }
            let row = params.first().map_or(1, |p| p.positive_or(1));
            let col = params.get(1).map_or(1, |p| p.positive_or(1));
            Ok(ParsedCommand::SetPosition { row, col })
        }
        CsiKind::Save => Ok(ParsedCommand::SaveCursor),
        CsiKind::Restore => Ok(ParsedCommand::RestoreCursor),
        CsiKind::Rendition => {
            if params.is_empty() {
                return Ok(ParsedCommand::GraphicRendition(vec![0]));
            }
            let mut codes = Vec::with_capacity(params.len());
            for param in params {
                match param {
                    Param::Number(n) if n <= 255 => codes.push(n as u16),
                    _ => return Err(malformed("rendition code outside 0..=255")),
                }
            }
            Ok(ParsedCommand::GraphicRendition(codes))
        }
    }
}
