//! Glyph grid: the cell-level form of a rendered frame.

use ascii_video_core::ansi::RESET;
use ascii_video_core::{Dimensions, GlyphCell, RenderedFrame};

/// Grid of glyph cells in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphGrid {
    /// Cell storage (row-major order)
    cells: Vec<GlyphCell>,
    /// Grid dimensions
    dimensions: Dimensions,
}

impl GlyphGrid {
    /// Blank grid of unstyled spaces.
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            cells: vec![GlyphCell::default(); dimensions.cell_count()],
            dimensions,
        }
    }

    /// Mutable cell at `row`, `col`, or `None` outside the grid.
    pub fn cell_mut(&mut self, row: u16, col: u16) -> Option<&mut GlyphCell> {
        if row < self.dimensions.rows && col < self.dimensions.cols {
            let idx = row as usize * self.dimensions.cols as usize + col as usize;
            self.cells.get_mut(idx)
        } else {
            None
        }
    }

    /// Iterate over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[GlyphCell]> {
        self.cells.chunks(self.dimensions.cols.max(1) as usize)
    }

    /// Get dimensions.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Serialize to escape-sequence text.
    ///
    /// Each row ends with a newline and the frame ends with a style reset.
    /// A color escape is only written where the style actually changes, so
    /// runs of identically colored cells share one escape.
    pub fn to_ansi(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() * 4 + self.dimensions.rows as usize);
        let mut prev: Option<&GlyphCell> = None;

        for row in self.rows() {
            for cell in row {
                out.push_str(&cell.style_transition(prev));
                out.push(cell.character);
                prev = Some(cell);
            }
            out.push('\n');
        }
        out.push_str(RESET);
        out
    }

    /// Freeze into a rendered frame.
    pub fn render(&self) -> RenderedFrame {
        RenderedFrame::new(self.to_ansi(), self.dimensions)
    }
}
