//! Graphic rendition state
//!
//! The pen holds the style flags and colors applied to every glyph written
//! after it changes. SGR parameter lists are merged into it, and it renders
//! itself back into the shortest `ESC[...m` that reproduces it, either in
//! full or as a difference against a previous pen.

use bitflags::bitflags;

use super::color::{Color, Layer};

bitflags! {
    /// Text style attributes
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct StyleFlags: u16 {
        const BOLD          = 0b0_0000_0001;
        const FAINT         = 0b0_0000_0010;
        const ITALIC        = 0b0_0000_0100;
        const UNDERLINE     = 0b0_0000_1000;
        const BLINK_SLOW    = 0b0_0001_0000;
        const BLINK_FAST    = 0b0_0010_0000;
        const INVERSE       = 0b0_0100_0000;
        const CONCEAL       = 0b0_1000_0000;
        const STRIKETHROUGH = 0b1_0000_0000;
    }
}

/// Flag, SGR code that sets it, SGR code that clears it
const FLAG_CODES: [(StyleFlags, u16, u16); 9] = [
    (StyleFlags::BOLD, 1, 22),
    (StyleFlags::FAINT, 2, 22),
    (StyleFlags::ITALIC, 3, 23),
    (StyleFlags::UNDERLINE, 4, 24),
    (StyleFlags::BLINK_SLOW, 5, 25),
    (StyleFlags::BLINK_FAST, 6, 25),
    (StyleFlags::INVERSE, 7, 27),
    (StyleFlags::CONCEAL, 8, 28),
    (StyleFlags::STRIKETHROUGH, 9, 29),
];

/// Prefix shown in place of ESC when escapes are rendered visibly
const VISIBLE_ESCAPE_PREFIX: &str = "\x1b[96m^[\x1b[0m[";

/// Errors from merging SGR codes into a pen
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("unrecognized graphic rendition code {0}")]
    UnknownCode(u16),
    #[error("malformed extended color sequence after code {0}")]
    ExtendedColor(u16),
}

/// How a pen is turned into escape text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EscapeOptions {
    /// Render classic colors through the fixed 256-color tables
    pub downsample: bool,
    /// Show the escape as visible text instead of emitting it raw
    pub visible: bool,
}

/// Current graphic attributes: style flags plus foreground/background
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pen {
    pub flags: StyleFlags,
    pub fg: Color,
    pub bg: Color,
}

impl Pen {
    /// Create a pen with default attributes
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether this pen has default attributes
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Merge a list of SGR codes into the pen, left to right.
    ///
    /// On error the codes before the failing one stay applied and the rest
    /// are dropped.
    pub fn merge(&mut self, codes: &[u16]) -> Result<(), MergeError> {
        let mut i = 0;
        while i < codes.len() {
            let code = codes[i];
            match code {
                0 => *self = Self::default(),
                1..=9 => self.flags.insert(FLAG_CODES[usize::from(code - 1)].0),
                21 => self.flags.remove(StyleFlags::BOLD),
                22 => self.flags.remove(StyleFlags::BOLD | StyleFlags::FAINT),
                23 => self.flags.remove(StyleFlags::ITALIC),
                24 => self.flags.remove(StyleFlags::UNDERLINE),
                25 => self
                    .flags
                    .remove(StyleFlags::BLINK_SLOW | StyleFlags::BLINK_FAST),
                26 => self.flags.remove(StyleFlags::BLINK_FAST),
                27 => self.flags.remove(StyleFlags::INVERSE),
                28 => self.flags.remove(StyleFlags::CONCEAL),
                29 => self.flags.remove(StyleFlags::STRIKETHROUGH),
                39 => self.fg = Color::Default,
                49 => self.bg = Color::Default,
                38 | 48 => {
                    let (color, consumed) = extended_color(&codes[i + 1..])
                        .ok_or(MergeError::ExtendedColor(code))?;
                    if code == 38 {
                        self.fg = color;
                    } else {
                        self.bg = color;
                    }
                    i += consumed;
                }
                _ => {
                    if let Some(color) = Color::from_fg_code(code) {
                        self.fg = color;
                    } else if let Some(color) = Color::from_bg_code(code) {
                        self.bg = color;
                    } else {
                        return Err(MergeError::UnknownCode(code));
                    }
                }
            }
            i += 1;
        }
        Ok(())
    }

    /// The color actually emitted for `layer` under `options`
    fn effective(&self, layer: Layer, options: EscapeOptions) -> Color {
        let color = match layer {
            Layer::Foreground => self.fg,
            Layer::Background => self.bg,
        }
        .resolve_default(layer);

        if options.downsample {
            let intense = layer == Layer::Foreground && self.flags.contains(StyleFlags::BOLD);
            color.downsample(intense)
        } else {
            color
        }
    }

    /// Render the pen as an SGR escape.
    ///
    /// With `as_diff`, only what changed relative to `previous` is emitted.
    /// Otherwise every active flag and both colors are emitted. Returns an
    /// empty string when there is nothing to emit.
    pub fn render(&self, previous: &Pen, as_diff: bool, options: EscapeOptions) -> String {
        let mut params: Vec<u16> = Vec::new();

        if as_diff {
            let changed = self.flags ^ previous.flags;
            for (flag, _, clear) in FLAG_CODES {
                if changed.contains(flag) && !self.flags.contains(flag) && !params.contains(&clear)
                {
                    params.push(clear);
                }
            }

            // 22 and 25 each clear two flags; re-assert the one still set
            let mut cleared = StyleFlags::empty();
            for (flag, _, clear) in FLAG_CODES {
                if params.contains(&clear) {
                    cleared |= flag;
                }
            }

            for (flag, set, _) in FLAG_CODES {
                if self.flags.contains(flag) && (changed | cleared).contains(flag) {
                    params.push(set);
                }
            }
        } else {
            for (flag, set, _) in FLAG_CODES {
                if self.flags.contains(flag) {
                    params.push(set);
                }
            }
        }

        for layer in [Layer::Foreground, Layer::Background] {
            let color = self.effective(layer, options);
            if !as_diff || color != previous.effective(layer, options) {
                color.push_params(layer, &mut params);
            }
        }

        if params.is_empty() {
            return String::new();
        }

        let joined = params
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(";");
        let prefix = if options.visible {
            VISIBLE_ESCAPE_PREFIX
        } else {
            "\x1b["
        };
        format!("{prefix}{joined}m")
    }
}

/// Decode the tail of a 38/48 sequence: `5;n` or `2;r;g;b`.
///
/// Returns the color and the number of codes consumed after the 38/48.
fn extended_color(rest: &[u16]) -> Option<(Color, usize)> {
    let component = |i: usize| rest.get(i).copied().and_then(|v| u8::try_from(v).ok());
    match rest.first()? {
        5 => Some((Color::Palette256(component(1)?), 2)),
        2 => Some((
            Color::TrueColor(component(1)?, component(2)?, component(3)?),
            4,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merged(codes: &[u16]) -> Pen {
        let mut pen = Pen::new();
        pen.merge(codes).unwrap();
        pen
    }

    #[test]
    fn test_pen_default() {
        let pen = Pen::new();
        assert!(pen.is_default());
        assert_eq!(pen.fg, Color::Default);
        assert_eq!(pen.bg, Color::Default);
        assert!(pen.flags.is_empty());
    }

    #[test]
    fn test_merge_reset() {
        let mut pen = merged(&[1, 4, 31, 44]);
        pen.merge(&[0]).unwrap();
        assert_eq!(pen, Pen::new());
        pen.merge(&[0]).unwrap();
        assert_eq!(pen, Pen::new());
    }

    #[test]
    fn test_merge_style_flags() {
        let pen = merged(&[1, 3, 9]);
        assert!(pen.flags.contains(StyleFlags::BOLD));
        assert!(pen.flags.contains(StyleFlags::ITALIC));
        assert!(pen.flags.contains(StyleFlags::STRIKETHROUGH));

        let mut pen = merged(&[1, 2, 5, 6]);
        pen.merge(&[21]).unwrap();
        assert!(!pen.flags.contains(StyleFlags::BOLD));
        assert!(pen.flags.contains(StyleFlags::FAINT));

        pen.merge(&[1, 22]).unwrap();
        assert!(!pen.flags.intersects(StyleFlags::BOLD | StyleFlags::FAINT));

        pen.merge(&[25]).unwrap();
        assert!(pen.flags.is_empty());
    }

    #[test]
    fn test_merge_classic_colors() {
        let pen = merged(&[31, 44]);
        assert_eq!(pen.fg, Color::Classic(Color::RED));
        assert_eq!(pen.bg, Color::Classic(Color::BLUE));

        let pen = merged(&[95, 102]);
        assert_eq!(pen.fg, Color::Classic(13));
        assert_eq!(pen.bg, Color::Classic(10));

        let pen = merged(&[31, 44, 39, 49]);
        assert_eq!(pen.fg, Color::Default);
        assert_eq!(pen.bg, Color::Default);
    }

    #[test]
    fn test_merge_extended_colors() {
        assert_eq!(merged(&[38, 5, 200]).fg, Color::Palette256(200));
        assert_eq!(merged(&[48, 5, 17]).bg, Color::Palette256(17));
        assert_eq!(merged(&[38, 2, 10, 20, 30]).fg, Color::TrueColor(10, 20, 30));

        // Codes after the extended color are still applied
        let pen = merged(&[38, 5, 200, 1, 44]);
        assert_eq!(pen.fg, Color::Palette256(200));
        assert!(pen.flags.contains(StyleFlags::BOLD));
        assert_eq!(pen.bg, Color::Classic(Color::BLUE));
    }

    #[test]
    fn test_merge_bad_extended_color_keeps_prior_state() {
        let mut pen = merged(&[1, 32]);
        assert_eq!(pen.merge(&[38, 9]), Err(MergeError::ExtendedColor(38)));
        assert!(pen.flags.contains(StyleFlags::BOLD));
        assert_eq!(pen.fg, Color::Classic(Color::GREEN));

        assert_eq!(pen.merge(&[48, 2, 1, 2]), Err(MergeError::ExtendedColor(48)));
        assert_eq!(pen.merge(&[38, 5]), Err(MergeError::ExtendedColor(38)));
        assert_eq!(pen.merge(&[38, 5, 256]), Err(MergeError::ExtendedColor(38)));
    }

    #[test]
    fn test_merge_unknown_code_aborts_rest() {
        let mut pen = Pen::new();
        assert_eq!(pen.merge(&[1, 50, 31]), Err(MergeError::UnknownCode(50)));
        assert!(pen.flags.contains(StyleFlags::BOLD));
        assert_eq!(pen.fg, Color::Default);
    }

    #[test]
    fn test_render_full() {
        let opts = EscapeOptions::default();
        assert_eq!(Pen::new().render(&Pen::new(), false, opts), "\x1b[37;40m");
        assert_eq!(
            merged(&[1, 31]).render(&Pen::new(), false, opts),
            "\x1b[1;31;40m"
        );
    }

    #[test]
    fn test_render_diff() {
        let opts = EscapeOptions::default();
        let base = merged(&[31]);
        assert_eq!(base.render(&base, true, opts), "");

        let bold = merged(&[1, 31]);
        assert_eq!(bold.render(&base, true, opts), "\x1b[1m");
        assert_eq!(base.render(&bold, true, opts), "\x1b[22m");

        let blue_bg = merged(&[31, 44]);
        assert_eq!(blue_bg.render(&base, true, opts), "\x1b[44m");

        // Default and explicit 37 render identically
        assert_eq!(merged(&[37]).render(&Pen::new(), true, opts), "");
    }

    #[test]
    fn test_render_diff_shared_clear_code() {
        let opts = EscapeOptions::default();
        let both = merged(&[1, 2]);
        let faint = merged(&[2]);
        assert_eq!(faint.render(&both, true, opts), "\x1b[22;2m");
    }

    #[test]
    fn test_render_downsampled() {
        let opts = EscapeOptions {
            downsample: true,
            visible: false,
        };
        assert_eq!(
            Pen::new().render(&Pen::new(), false, opts),
            "\x1b[38;5;248;48;5;16m"
        );

        // Bold brightens the foreground, so toggling it re-emits the color
        let red = merged(&[31]);
        let bold_red = merged(&[1, 31]);
        assert_eq!(bold_red.render(&red, true, opts), "\x1b[1;38;5;203m");
    }

    #[test]
    fn test_render_visible() {
        let opts = EscapeOptions {
            downsample: false,
            visible: true,
        };
        assert_eq!(
            merged(&[32]).render(&Pen::new(), true, opts),
            "\x1b[96m^[\x1b[0m[32m"
        );
    }
}
