//! Pixel-to-glyph mapping strategies.
//!
//! Every strategy maps a resized [`Frame`] to a [`GlyphGrid`] with one cell
//! per pixel. Strategies hold only immutable configuration, so mapping is a
//! pure function of the input frame.

use serde::{Deserialize, Serialize};

use ascii_video_core::{Color, ColorMode, Dimensions, GlyphCell, RenderedFrame, StrategyKind};

use crate::grid::GlyphGrid;
use crate::source::Frame;

/// Glyphs ordered from sparse to dense.
pub const DENSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Glyph used by the color strategy for every cell.
pub const SOLID_GLYPH: char = '█';

/// Shade blocks ordered from light to full, used by the filled strategy.
pub const FILLED_RAMP: &[char] = &['░', '▒', '▓', '█'];

/// Perceived brightness of a pixel (ITU-R BT.601 weights), 0..=255.
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

/// Pick the ramp entry for a brightness value; brighter pixels get denser glyphs.
pub fn ramp_glyph(ramp: &[char], lum: u8) -> char {
    let idx = lum as usize * ramp.len() / 256;
    ramp[idx.min(ramp.len() - 1)]
}

/// Rendering strategy, selected from configuration at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderStrategy {
    /// Solid block colored with the pixel's RGB value.
    Color {
        /// How colors are encoded
        mode: ColorMode,
    },
    /// Density ramp by brightness, no color codes.
    Monochrome,
    /// Shade block by brightness, colored and bold.
    Filled {
        /// How colors are encoded
        mode: ColorMode,
    },
}

impl Default for RenderStrategy {
    fn default() -> Self {
        RenderStrategy::Color {
            mode: ColorMode::default(),
        }
    }
}

impl RenderStrategy {
    /// Build a strategy from its configured kind.
    pub fn from_kind(kind: StrategyKind, mode: ColorMode) -> Self {
        match kind {
            StrategyKind::Color => RenderStrategy::Color { mode },
            StrategyKind::Monochrome => RenderStrategy::Monochrome,
            StrategyKind::Filled => RenderStrategy::Filled { mode },
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            RenderStrategy::Color { .. } => "color",
            RenderStrategy::Monochrome => "monochrome",
            RenderStrategy::Filled { .. } => "filled",
        }
    }

    /// Map a single pixel to its glyph cell.
    pub fn map_pixel(&self, r: u8, g: u8, b: u8) -> GlyphCell {
        match *self {
            RenderStrategy::Color { mode } => {
                GlyphCell::with_fg(SOLID_GLYPH, Color::from_rgb(r, g, b, mode))
            }
            RenderStrategy::Monochrome => {
                GlyphCell::new(ramp_glyph(DENSITY_RAMP, luminance(r, g, b)))
            }
            RenderStrategy::Filled { mode } => GlyphCell::with_fg(
                ramp_glyph(FILLED_RAMP, luminance(r, g, b)),
                Color::from_rgb(r, g, b, mode),
            )
            .bold(),
        }
    }

    /// Map a resized frame to a glyph grid of the same size.
    pub fn map(&self, frame: &Frame) -> GlyphGrid {
        let dims = Dimensions::new(
            frame.height().min(u16::MAX as u32) as u16,
            frame.width().min(u16::MAX as u32) as u16,
        );
        let mut grid = GlyphGrid::new(dims);

        for (x, y, pixel) in frame.enumerate_pixels() {
            let [r, g, b] = pixel.0;
            if let Some(cell) = grid.cell_mut(y as u16, x as u16) {
                *cell = self.map_pixel(r, g, b);
            }
        }

        grid
    }

    /// Map and serialize in one step.
    pub fn render(&self, frame: &Frame) -> RenderedFrame {
        self.map(frame).render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_luminance_extremes() {
        assert_eq!(luminance(0, 0, 0), 0);
        assert_eq!(luminance(255, 255, 255), 255);
        assert!(luminance(0, 255, 0) > luminance(255, 0, 0));
        assert!(luminance(255, 0, 0) > luminance(0, 0, 255));
    }

    #[test]
    fn test_ramp_glyph_bounds() {
        assert_eq!(ramp_glyph(DENSITY_RAMP, 0), ' ');
        assert_eq!(ramp_glyph(DENSITY_RAMP, 255), '@');
        assert_eq!(ramp_glyph(FILLED_RAMP, 0), '░');
        assert_eq!(ramp_glyph(FILLED_RAMP, 255), '█');
    }

    #[test]
    fn test_color_strategy_cells() {
        let strategy = RenderStrategy::Color {
            mode: ColorMode::TrueColor,
        };
        let cell = strategy.map_pixel(10, 20, 30);
        assert_eq!(cell.character, SOLID_GLYPH);
        assert_eq!(cell.fg, Some(Color::Rgb { r: 10, g: 20, b: 30 }));
    }

    #[test]
    fn test_ansi256_mode() {
        let strategy = RenderStrategy::Color {
            mode: ColorMode::Ansi256,
        };
        let cell = strategy.map_pixel(255, 0, 0);
        assert!(matches!(cell.fg, Some(Color::Indexed(_))));
    }

    #[test]
    fn test_monochrome_emits_no_color() {
        let frame = Frame::from_fn(4, 2, |x, _| Rgb([(x * 80) as u8; 3]));
        let rendered = RenderStrategy::Monochrome.render(&frame);
        let body = rendered.body();
        assert!(!body.contains("38;"));
        assert_eq!(body.matches('\n').count(), 2);
        assert!(body.ends_with("\x1b[0m"));
    }

    #[test]
    fn test_filled_is_bold_and_colored() {
        let cell = RenderStrategy::Filled {
            mode: ColorMode::TrueColor,
        }
        .map_pixel(255, 255, 255);
        assert_eq!(cell.character, '█');
        assert!(cell.attrs.bold);
        assert!(cell.fg.is_some());
    }

    #[test]
    fn test_map_preserves_dimensions() {
        let frame = Frame::from_pixel(7, 3, Rgb([1, 2, 3]));
        for strategy in [
            RenderStrategy::default(),
            RenderStrategy::Monochrome,
            RenderStrategy::Filled {
                mode: ColorMode::Ansi256,
            },
        ] {
            assert_eq!(strategy.map(&frame).dimensions(), Dimensions::new(3, 7));
        }
    }

    #[test]
    fn test_uniform_color_coalesces_to_one_escape() {
        let frame = Frame::from_pixel(5, 2, Rgb([9, 9, 9]));
        let body = RenderStrategy::default().render(&frame);
        assert_eq!(body.body().matches("\x1b[38;2;9;9;9m").count(), 1);
    }

    #[test]
    fn test_from_kind() {
        assert_eq!(
            RenderStrategy::from_kind(StrategyKind::Monochrome, ColorMode::TrueColor),
            RenderStrategy::Monochrome
        );
        assert_eq!(
            RenderStrategy::from_kind(StrategyKind::Filled, ColorMode::Ansi256).name(),
            "filled"
        );
    }
}
