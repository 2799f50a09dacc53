//! Glyph cell and color types for rendered frames.

use serde::{Deserialize, Serialize};

/// Foreground color: a bright tint, a 256-color palette index, or true RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    /// Bright red (91)
    BrightRed,
    /// Bright green (92)
    BrightGreen,
    /// Bright yellow (93)
    BrightYellow,
    /// Bright blue (94)
    BrightBlue,
    /// Bright magenta (95)
    BrightMagenta,
    /// Bright cyan (96)
    BrightCyan,

    /// 256-color palette index (0-255)
    Indexed(u8),

    /// True color RGB (24-bit)
    Rgb {
        /// Red component
        r: u8,
        /// Green component
        g: u8,
        /// Blue component
        b: u8,
    },
}

impl Color {
    /// Rotating tint applied to precomputed frames, indexed by `frame_index % len`.
    pub const TINT_PALETTE: [Color; 6] = [
        Color::BrightYellow,
        Color::BrightCyan,
        Color::BrightRed,
        Color::BrightGreen,
        Color::BrightMagenta,
        Color::BrightBlue,
    ];

    /// Tint color for the frame at `index`.
    pub fn tint_for(index: usize) -> Color {
        Self::TINT_PALETTE[index % Self::TINT_PALETTE.len()]
    }

    /// Build a color from a pixel, honoring the output color mode.
    pub fn from_rgb(r: u8, g: u8, b: u8, mode: ColorMode) -> Self {
        match mode {
            ColorMode::TrueColor => Color::Rgb { r, g, b },
            ColorMode::Ansi256 => Color::Indexed(nearest_ansi256(r, g, b)),
        }
    }

    /// SGR parameter string selecting this color as foreground (without `ESC[` and `m`).
    pub fn fg_params(&self) -> String {
        match self {
            Color::BrightRed => "91".to_string(),
            Color::BrightGreen => "92".to_string(),
            Color::BrightYellow => "93".to_string(),
            Color::BrightBlue => "94".to_string(),
            Color::BrightMagenta => "95".to_string(),
            Color::BrightCyan => "96".to_string(),
            Color::Indexed(idx) => format!("38;5;{idx}"),
            Color::Rgb { r, g, b } => format!("38;2;{r};{g};{b}"),
        }
    }

    /// Full escape sequence selecting this color as foreground.
    pub fn fg_sequence(&self) -> String {
        format!("\x1b[{}m", self.fg_params())
    }
}

/// Map an RGB triple onto the xterm 256-color palette.
///
/// Near-gray pixels use the 24-step grayscale ramp, everything else the 6x6x6 cube.
pub fn nearest_ansi256(r: u8, g: u8, b: u8) -> u8 {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max - min < 8 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        if avg < 8 {
            return 16;
        }
        if avg > 248 {
            return 231;
        }
        return 232 + ((avg - 8) * 24 / 241).min(23) as u8;
    }
    let q = |v: u8| (v as u16 * 5 + 127) / 255;
    (16 + 36 * q(r) + 6 * q(g) + q(b)) as u8
}

/// How pixel colors are encoded in escape sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// 24-bit `38;2;r;g;b`
    #[default]
    TrueColor,
    /// Nearest xterm palette entry, `38;5;n`
    Ansi256,
}

/// Text attributes for a glyph cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellAttributes {
    /// Bold/bright text
    pub bold: bool,
}

impl CellAttributes {
    /// Check if attributes are all default (no formatting).
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Create attributes with bold enabled.
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// One character of a rendered frame plus its styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphCell {
    /// Unicode character
    pub character: char,
    /// Foreground color, `None` for monochrome output
    pub fg: Option<Color>,
    /// Text attributes
    pub attrs: CellAttributes,
}

impl Default for GlyphCell {
    fn default() -> Self {
        Self {
            character: ' ',
            fg: None,
            attrs: CellAttributes::default(),
        }
    }
}

impl GlyphCell {
    /// Create a new cell with a character and no styling.
    pub fn new(character: char) -> Self {
        Self {
            character,
            ..Default::default()
        }
    }

    /// Create a cell with character and foreground color.
    pub fn with_fg(character: char, fg: Color) -> Self {
        Self {
            character,
            fg: Some(fg),
            ..Default::default()
        }
    }

    /// Return a copy of this cell with bold enabled.
    pub fn bold(mut self) -> Self {
        self.attrs = self.attrs.with_bold();
        self
    }

    /// Check whether the cell carries any styling at all.
    pub fn is_plain(&self) -> bool {
        self.fg.is_none() && self.attrs.is_default()
    }

    /// Check whether two cells render with the same escape state.
    pub fn same_style(&self, other: &GlyphCell) -> bool {
        self.fg == other.fg && self.attrs == other.attrs
    }

    /// Escape sequence that switches the terminal from `prev`'s style to this cell's style.
    ///
    /// Returns an empty string when the style is unchanged, which is what lets
    /// adjacent cells share one color run.
    pub fn style_transition(&self, prev: Option<&GlyphCell>) -> String {
        let unstyled = GlyphCell::default();
        let prev = prev.unwrap_or(&unstyled);
        if self.same_style(prev) {
            return String::new();
        }

        let mut params: Vec<String> = Vec::new();
        // Attributes can only be switched off by a full reset.
        if (prev.attrs.bold && !self.attrs.bold) || (self.fg.is_none() && prev.fg.is_some()) {
            params.push("0".to_string());
            if self.attrs.bold {
                params.push("1".to_string());
            }
        } else if self.attrs.bold && !prev.attrs.bold {
            params.push("1".to_string());
        }
        if let Some(fg) = self.fg {
            if Some(fg) != prev.fg || params.first().is_some_and(|p| p == "0") {
                params.push(fg.fg_params());
            }
        }

        if params.is_empty() {
            String::new()
        } else {
            format!("\x1b[{}m", params.join(";"))
        }
    }
}
