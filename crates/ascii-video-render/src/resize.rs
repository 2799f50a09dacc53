//! Aspect-corrected resizing from pixel grids to character grids.
//!
//! Terminal cells are roughly twice as tall as they are wide, so the target
//! width is doubled relative to the source aspect ratio.

use image::imageops::{self, FilterType};

use ascii_video_core::Dimensions;

use crate::source::Frame;

/// Horizontal stretch compensating for tall terminal cells.
pub const CELL_ASPECT: f64 = 2.0;

/// Character-grid size for a `src_width` x `src_height` frame rendered `rows` tall.
///
/// `cols = round(rows * src_width / src_height * 2)`, never less than 1.
pub fn target_dimensions(src_width: u32, src_height: u32, rows: u16) -> Dimensions {
    let rows = rows.max(1);
    let cols = if src_height == 0 {
        1.0
    } else {
        (rows as f64 * src_width as f64 / src_height as f64 * CELL_ASPECT).round()
    };
    let cols = cols.clamp(1.0, u16::MAX as f64) as u16;
    Dimensions::new(rows, cols)
}

/// Resizes frames to a fixed character-grid height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resizer {
    rows: u16,
}

impl Resizer {
    /// Create a resizer targeting `rows` character rows.
    pub fn new(rows: u16) -> Self {
        Self { rows: rows.max(1) }
    }

    /// Target row count.
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Grid size a frame of the given pixel size will be resized to.
    pub fn dimensions_for(&self, frame: &Frame) -> Dimensions {
        target_dimensions(frame.width(), frame.height(), self.rows)
    }

    /// Resample `frame` to one pixel per character cell (bilinear, deterministic).
    pub fn resize(&self, frame: &Frame) -> Frame {
        let dims = self.dimensions_for(frame);
        imageops::resize(frame, dims.cols as u32, dims.rows as u32, FilterType::Triangle)
    }
}
