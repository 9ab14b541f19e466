//! Conversion Core Module
//!
//! Platform-independent rendering state. This module contains:
//! - Code page translation (CP437 to Unicode)
//! - Color model and 256-color downsampling
//! - Pen (graphic rendition) state with SGR merge and diff rendering
//! - Cell, line and cursor representation
//! - The growable virtual screen and its serializer
//!
//! The core is deterministic: given the same sequence of writes and cursor
//! operations, it always serializes to the same bytes.

mod cell;
mod charset;
mod color;
mod cursor;
mod line;
mod pen;
mod screen;

pub use cell::Cell;
pub use charset::{translate, CP437};
pub use color::{Color, Layer, DARK_PALETTE, LIGHT_PALETTE};
pub use cursor::{Position, SavedCursor};
pub use line::Line;
pub use pen::{EscapeOptions, MergeError, Pen, StyleFlags};
pub use screen::{BaselinePolicy, LineErase, PositionError, RenderOptions, Screen, RESET};
