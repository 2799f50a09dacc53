//! Escape-aware measurement of pre-rendered frame text.
//!
//! Precomputed frame bodies are opaque text with embedded color sequences.
//! Feeding them through a VTE state machine lets us count visible glyphs
//! while ignoring the control sequences in between.

use vte::{Params, Perform};

use ascii_video_core::Dimensions;

/// Tab stops every eight columns.
const TAB_WIDTH: u32 = 8;

/// Tracks visible columns and line breaks.
#[derive(Debug, Default)]
struct Measurer {
    /// Column in the current line
    col: u32,
    /// Widest line so far
    max_cols: u32,
    /// Completed lines
    lines: u32,
}

impl Measurer {
    fn end_line(&mut self) {
        self.max_cols = self.max_cols.max(self.col);
        self.col = 0;
        self.lines += 1;
    }

    fn finish(mut self) -> (u32, u32) {
        let trailing = self.col > 0;
        self.max_cols = self.max_cols.max(self.col);
        let rows = self.lines + u32::from(trailing);
        (rows, self.max_cols)
    }
}

impl Perform for Measurer {
    fn print(&mut self, _c: char) {
        self.col += 1;
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            // Line feed
            b'\n' => self.end_line(),
            // Carriage return
            b'\r' => {
                self.max_cols = self.max_cols.max(self.col);
                self.col = 0;
            }
            // Horizontal tab
            b'\t' => self.col = (self.col / TAB_WIDTH + 1) * TAB_WIDTH,
            _ => {}
        }
    }

    fn csi_dispatch(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _c: char) {
        // SGR and cursor sequences take up no cells.
    }
}

/// Visible grid size of a rendered frame body.
///
/// Rows are line feeds plus one for a final unterminated line; columns are the
/// widest line in printed characters.
pub fn measure(body: &str) -> Dimensions {
    let mut measurer = Measurer::default();
    let mut parser = vte::Parser::new();
    for byte in body.bytes() {
        parser.advance(&mut measurer, byte);
    }

    let (rows, cols) = measurer.finish();
    Dimensions::new(
        rows.min(u16::MAX as u32) as u16,
        cols.min(u16::MAX as u32) as u16,
    )
}
