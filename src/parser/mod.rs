//! ANSI.SYS escape sequence parser
//!
//! A byte-fed parser that collects the text after ESC until a terminator
//! arrives, then validates it into a [`ParsedCommand`]. Text outside escape
//! sequences is left to the caller.

mod actions;
mod state;

pub use actions::{Direction, DisplayErase, ParsedCommand};
pub use state::{ParseError, Parser, TERMINATORS};
