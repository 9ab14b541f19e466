//! Conversion driver
//!
//! Ties together the parser, pen and screen model. Input bytes are scanned
//! one at a time: text bytes are translated and written at the cursor,
//! escape sequences are parsed and applied, and once the input is consumed
//! the screen is serialized to the output.
//!
//! Each call to [`Converter::convert`] owns a fresh screen, pen and parser,
//! so one converter can process many documents in sequence.

use std::io::{BufReader, Read, Write};
use std::num::NonZeroUsize;

use crate::config::{Config, UnhandledPolicy};
use crate::core::{translate, MergeError, Pen, Position, PositionError, SavedCursor, Screen};
use crate::error::ConvertError;
use crate::parser::{DisplayErase, ParseError, ParsedCommand, Parser};

const NUL: u8 = 0x00;
const SUB: u8 = 0x1A;
const ESC: u8 = 0x1B;

/// A recoverable condition met during conversion
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error(transparent)]
    MalformedEscape(#[from] ParseError),
    #[error(transparent)]
    InvalidPosition(#[from] PositionError),
    #[error(transparent)]
    AttributeMerge(#[from] MergeError),
    #[error("skipped unhandled escape command '{}'", char::from(*.0))]
    UnhandledCommand(u8),
    #[error("row {row} exceeds the limit of {limit} rows")]
    RowLimit { row: usize, limit: usize },
}

/// Receiver for diagnostics, called with the byte offset they occurred at
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: &Diagnostic, offset: u64);
}

impl<F> DiagnosticSink for F
where
    F: FnMut(&Diagnostic, u64),
{
    fn report(&mut self, diagnostic: &Diagnostic, offset: u64) {
        self(diagnostic, offset)
    }
}

/// Outcome of a successful conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Input bytes consumed, up to and including a NUL/SUB stop byte
    pub bytes_read: u64,
    /// Rows written to the output
    pub rows: usize,
    /// Recoverable conditions met along the way
    pub diagnostics: usize,
}

/// Per-document state
struct Session {
    screen: Screen,
    parser: Parser,
    pen: Pen,
    cursor: Position,
    saved: SavedCursor,
    diagnostics: usize,
}

impl Session {
    fn new(width: NonZeroUsize, strict: bool) -> Self {
        Self {
            screen: Screen::new(width),
            parser: if strict { Parser::strict() } else { Parser::new() },
            pen: Pen::new(),
            cursor: Position::HOME,
            saved: SavedCursor::default(),
            diagnostics: 0,
        }
    }
}

/// Converts ANSI art documents into UTF-8 terminal output
pub struct Converter<'a> {
    config: Config,
    width: NonZeroUsize,
    sink: Option<Box<dyn DiagnosticSink + 'a>>,
}

impl<'a> Converter<'a> {
    /// Create a converter, rejecting a zero width
    pub fn new(config: Config) -> Result<Self, ConvertError> {
        let width = NonZeroUsize::new(config.width).ok_or(ConvertError::InvalidWidth(config.width))?;
        Ok(Self {
            config,
            width,
            sink: None,
        })
    }

    /// Install a diagnostic sink
    pub fn with_diagnostics(mut self, sink: impl DiagnosticSink + 'a) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert one document from `input`, writing the rendered rows to `output`.
    ///
    /// The output is not flushed.
    pub fn convert<R: Read, W: Write>(
        &mut self,
        input: R,
        output: &mut W,
    ) -> Result<ConversionSummary, ConvertError> {
        let mut session = Session::new(self.width, self.config.strict_terminators);
        tracing::debug!(width = self.width.get(), "starting conversion");

        let bytes_read = self.scan(&mut session, input)?;
        if session.parser.in_escape() {
            tracing::debug!(offset = bytes_read, "input ended inside an escape sequence");
        }

        session
            .screen
            .serialize(output, &self.config.render_options())
            .map_err(ConvertError::Write)?;

        let summary = ConversionSummary {
            bytes_read,
            rows: session.screen.height(),
            diagnostics: session.diagnostics,
        };
        tracing::info!(
            bytes_read = summary.bytes_read,
            rows = summary.rows,
            diagnostics = summary.diagnostics,
            "conversion finished"
        );
        Ok(summary)
    }

    /// Convert an in-memory document into a string
    pub fn convert_to_string(&mut self, input: &[u8]) -> Result<String, ConvertError> {
        let mut buf = Vec::new();
        self.convert(input, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Consume the input, returning the number of bytes read
    fn scan<R: Read>(&mut self, session: &mut Session, input: R) -> Result<u64, ConvertError> {
        let mut offset: u64 = 0;

        for byte in BufReader::new(input).bytes() {
            let byte = byte.map_err(|source| ConvertError::Read { offset, source })?;

            if byte == NUL || byte == SUB {
                tracing::debug!(offset, byte, "stop byte, ignoring the rest of the input");
                return Ok(offset + 1);
            }

            if session.parser.in_escape() {
                match session.parser.feed(byte) {
                    Some(Ok(command)) => self.dispatch(session, command, offset)?,
                    Some(Err(ParseError::UnknownTerminator { byte, .. })) => {
                        return Err(ConvertError::UnknownTerminator { byte, offset });
                    }
                    Some(Err(err)) => self.report(session, err.into(), offset),
                    None => {}
                }
            } else {
                match byte {
                    ESC => session.parser.begin(),
                    b'\r' => session.cursor.carriage_return(),
                    b'\n' => {
                        let mut next = session.cursor;
                        next.row = next.row.saturating_add(1);
                        self.limit_row(session, &mut next, offset);
                        session.cursor = next;
                        session.screen.touch(next.row);
                    }
                    _ => self.print(session, byte, offset),
                }
            }

            offset += 1;
        }

        Ok(offset)
    }

    /// Write a text byte at the cursor and advance
    fn print(&mut self, session: &mut Session, byte: u8, offset: u64) {
        let ch = translate(byte);
        if let Err(err) = session.screen.put(session.cursor, ch, session.pen) {
            self.report(session, err.into(), offset);
        }

        let limit = self.config.max_rows;
        if let Some(row) = session.screen.advance(&mut session.cursor, limit) {
            self.report(session, Diagnostic::RowLimit { row, limit }, offset);
        }
    }

    /// Apply a parsed command
    fn dispatch(
        &mut self,
        session: &mut Session,
        command: ParsedCommand,
        offset: u64,
    ) -> Result<(), ConvertError> {
        tracing::trace!(offset, ?command, "dispatch");

        match command {
            ParsedCommand::Move(direction, n) => {
                let (dx, dy) = direction.delta(n);
                session.screen.move_relative(&mut session.cursor, dx, dy);
            }
            ParsedCommand::SetPosition { row, col } => {
                let mut target = Position::new(col, row);
                self.limit_row(session, &mut target, offset);
                session
                    .screen
                    .set_absolute(&mut session.cursor, target.row, target.col);
            }
            ParsedCommand::EraseDisplay(mode) => match mode {
                DisplayErase::ToEnd => session.screen.erase_to_end(session.cursor),
                DisplayErase::ToStart => session.screen.erase_to_start(session.cursor),
                DisplayErase::All => {
                    session.cursor = Position::HOME;
                    session.screen.erase_all();
                }
                DisplayErase::Scrollback => session.screen.erase_all(),
            },
            ParsedCommand::EraseLine(mode) => session.screen.erase_line(session.cursor, mode),
            ParsedCommand::SaveCursor => {
                session.saved = SavedCursor::save(session.cursor, session.pen);
            }
            ParsedCommand::RestoreCursor => {
                session.cursor = session.saved.position;
                session.pen = session.saved.pen;
                session.screen.touch(session.cursor.row);
            }
            ParsedCommand::GraphicRendition(codes) => {
                if let Err(err) = session.pen.merge(&codes) {
                    self.report(session, err.into(), offset);
                }
            }
            ParsedCommand::Ignored(letter) => {
                tracing::trace!(offset, letter = %char::from(letter), "ignored escape command");
            }
            ParsedCommand::Unhandled(command) => match self.config.unhandled {
                UnhandledPolicy::Abort => {
                    return Err(ConvertError::UnhandledCommand { command, offset });
                }
                UnhandledPolicy::Skip => {
                    self.report(session, Diagnostic::UnhandledCommand(command), offset);
                }
            },
        }

        Ok(())
    }

    /// Clamp `pos` to the configured row limit
    fn limit_row(&mut self, session: &mut Session, pos: &mut Position, offset: u64) {
        let limit = self.config.max_rows;
        if limit > 0 && pos.row > limit {
            self.report(session, Diagnostic::RowLimit { row: pos.row, limit }, offset);
            pos.row = limit;
        }
    }

    fn report(&mut self, session: &mut Session, diagnostic: Diagnostic, offset: u64) {
        session.diagnostics += 1;
        tracing::trace!(offset, %diagnostic, "recovered");
        if let Some(sink) = self.sink.as_mut() {
            sink.report(&diagnostic, offset);
        }
    }
}
