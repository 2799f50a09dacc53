//! Strided selection over an animation's frames.

use ascii_video_core::Stride;

/// Indices of the frames a session plays, in order.
///
/// Every `stride`-th frame starting at 0. When the stride reaches past the
/// end only frame 0 is selected, giving a single-frame loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    indices: Vec<usize>,
}

impl Selection {
    /// Select from `len` frames with `stride`.
    pub fn new(len: usize, stride: Stride) -> Self {
        Self {
            indices: (0..len).step_by(stride.get().max(1)).collect(),
        }
    }

    /// Frame indices in playback order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of selected frames.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True only for an empty source sequence.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Frame index at cursor position `i`, wrapping around.
    pub fn frame_at(&self, i: usize) -> Option<usize> {
        if self.indices.is_empty() {
            None
        } else {
            Some(self.indices[i % self.indices.len()])
        }
    }

    /// Cursor position following `i`.
    pub fn next(&self, i: usize) -> usize {
        if self.indices.is_empty() {
            0
        } else {
            (i + 1) % self.indices.len()
        }
    }
}
