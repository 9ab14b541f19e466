//! Color representation for screen cells
//!
//! Supports:
//! - Default foreground/background (the DOS pen, light grey on black)
//! - 16 classic ANSI colors (0-7 normal, 8-15 bright)
//! - 256-color palette
//! - 24-bit true color
//!
//! Classic colors can be downsampled to fixed 256-palette entries that
//! approximate the VGA text-mode colors independent of the terminal theme.

use serde::{Deserialize, Serialize};

/// Color slot a color is rendered into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Foreground,
    Background,
}

/// Color representation supporting all SGR color modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// Default pen color
    #[default]
    Default,
    /// Classic color index (0-7 normal, 8-15 bright)
    Classic(u8),
    /// 256-color palette index
    Palette256(u8),
    /// 24-bit RGB color
    TrueColor(u8, u8, u8),
}

/// Closest xterm-256 indices for the normal-intensity VGA colors
pub const DARK_PALETTE: [u8; 8] = [
    16,  // #000000
    124, // #AB0000
    34,  // #00AB00
    130, // #AB5700
    19,  // #0000AB
    127, // #AB00AB
    37,  // #00ABAB
    248, // #ABABAB
];

/// Closest xterm-256 indices for the high-intensity VGA colors
pub const LIGHT_PALETTE: [u8; 8] = [
    240, // #575757
    203, // #FF5757
    83,  // #57FF57
    227, // #FFFF57
    63,  // #5757FF
    207, // #FF57FF
    87,  // #57FFFF
    15,  // #FFFFFF
];

impl Color {
    /// Classic color indices
    pub const BLACK: u8 = 0;
    pub const RED: u8 = 1;
    pub const GREEN: u8 = 2;
    pub const YELLOW: u8 = 3;
    pub const BLUE: u8 = 4;
    pub const MAGENTA: u8 = 5;
    pub const CYAN: u8 = 6;
    pub const WHITE: u8 = 7;

    /// Classic color selected by an SGR foreground code (30-37, 90-97)
    pub fn from_fg_code(code: u16) -> Option<Self> {
        match code {
            30..=37 => Some(Color::Classic((code - 30) as u8)),
            90..=97 => Some(Color::Classic((code - 90) as u8 + 8)),
            _ => None,
        }
    }

    /// Classic color selected by an SGR background code (40-47, 100-107)
    pub fn from_bg_code(code: u16) -> Option<Self> {
        match code {
            40..=47 => Some(Color::Classic((code - 40) as u8)),
            100..=107 => Some(Color::Classic((code - 100) as u8 + 8)),
            _ => None,
        }
    }

    /// Replace `Default` with the classic color the DOS pen used for this layer
    pub fn resolve_default(self, layer: Layer) -> Self {
        match (self, layer) {
            (Color::Default, Layer::Foreground) => Color::Classic(Self::WHITE),
            (Color::Default, Layer::Background) => Color::Classic(Self::BLACK),
            (color, _) => color,
        }
    }

    /// Map a classic color onto the fixed 256-palette tables.
    ///
    /// Bright classic colors (8-15) always use the light table; normal ones
    /// use it only when `intense` is set. Any other color is returned as is.
    pub fn downsample(self, intense: bool) -> Self {
        match self {
            Color::Classic(index) => {
                let table = if index >= 8 || intense {
                    &LIGHT_PALETTE
                } else {
                    &DARK_PALETTE
                };
                Color::Palette256(table[usize::from(index % 8)])
            }
            other => other,
        }
    }

    /// Append the SGR parameters selecting this color on `layer`
    pub fn push_params(self, layer: Layer, out: &mut Vec<u16>) {
        let (base, bright_base, extended) = match layer {
            Layer::Foreground => (30, 90, 38),
            Layer::Background => (40, 100, 48),
        };
        match self {
            Color::Default => out.push(base + 9),
            Color::Classic(index) if index < 8 => out.push(base + u16::from(index)),
            Color::Classic(index) => out.push(bright_base + u16::from(index % 8)),
            Color::Palette256(index) => out.extend([extended, 5, u16::from(index)]),
            Color::TrueColor(r, g, b) => {
                out.extend([extended, 2, u16::from(r), u16::from(g), u16::from(b)])
            }
        }
    }
}
