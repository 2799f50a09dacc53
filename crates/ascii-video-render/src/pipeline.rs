//! Resize-then-map pipeline turning raw frames into rendered frames.

use tracing::{debug, warn};

use ascii_video_core::RenderedFrame;

use crate::mapper::RenderStrategy;
use crate::resize::Resizer;
use crate::source::{Frame, FrameSource};

/// Resizer plus mapping strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePipeline {
    resizer: Resizer,
    strategy: RenderStrategy,
}

impl FramePipeline {
    /// Create a pipeline rendering `rows` tall with `strategy`.
    pub fn new(rows: u16, strategy: RenderStrategy) -> Self {
        Self {
            resizer: Resizer::new(rows),
            strategy,
        }
    }

    /// The resizer in use.
    pub fn resizer(&self) -> Resizer {
        self.resizer
    }

    /// Render one raw frame.
    pub fn render(&self, frame: &Frame) -> RenderedFrame {
        let resized = self.resizer.resize(frame);
        self.strategy.render(&resized)
    }

    /// Drain a source, rendering every frame it yields.
    ///
    /// Frames the source fails to deliver are skipped with a warning.
    pub fn render_all(&self, source: &mut dyn FrameSource) -> Vec<RenderedFrame> {
        let mut frames = Vec::with_capacity(source.len_hint().unwrap_or(0));
        let mut index = 0usize;

        while let Some(item) = source.next_frame() {
            match item {
                Ok(frame) => frames.push(self.render(&frame)),
                Err(e) => warn!("Skipping frame {} of {}: {}", index, source.describe(), e),
            }
            index += 1;
        }

        debug!(
            "Rendered {} of {} frames from {} ({})",
            frames.len(),
            index,
            source.describe(),
            self.strategy.name()
        );
        frames
    }
}
