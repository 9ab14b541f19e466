//! ANSI art to UTF-8 converter
//!
//! Renders DOS-era ANSI art (CP437 text interleaved with ANSI.SYS cursor and
//! color escapes) into UTF-8 terminal output of a fixed width. This crate
//! provides:
//!
//! - `core`: Code page and color tables, pen, cells and the virtual screen
//! - `parser`: ANSI.SYS escape sequence parser
//! - `converter`: Drives the parser over a byte stream and serializes the screen
//! - `config`: Layered configuration (defaults, JSON file, CLI flags)
//!
//! ```
//! use ansiart_utf8::{Config, Converter};
//!
//! let mut converter = Converter::new(Config { width: 3, ..Default::default() }).unwrap();
//! let out = converter.convert_to_string(b"\x1b[31mA").unwrap();
//! assert_eq!(out, "\x1b[0m\x1b[31;40mA\x1b[37m  \x1b[0m\n");
//! ```

pub mod config;
pub mod converter;
pub mod core;
pub mod error;
pub mod parser;

pub use config::{CliArgs, Config, ConfigError, UnhandledPolicy};
pub use converter::{ConversionSummary, Converter, Diagnostic, DiagnosticSink};
pub use error::ConvertError;
