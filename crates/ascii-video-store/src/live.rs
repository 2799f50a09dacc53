//! Live decoding of a frame source into an animation.

use std::path::Path;

use tracing::{info, warn};

use ascii_video_core::{Animation, Color, RenderedFrame};
use ascii_video_render::{open_source, FramePipeline, FrameSource};

use crate::placeholder::placeholder;
use crate::precomputed::dominant_dimensions;

/// Render every frame of `source` into an animation named `name`.
///
/// Frames the source cannot deliver, and frames whose size differs from the
/// size most frames share, are skipped. No usable frames yields the placeholder.
pub fn animate_source(
    name: &str,
    source: &mut dyn FrameSource,
    pipeline: &FramePipeline,
    tint: bool,
) -> Animation {
    let rendered = pipeline.render_all(source);
    let expected = dominant_dimensions(rendered.iter().map(RenderedFrame::dimensions));

    let mut frames: Vec<RenderedFrame> = Vec::with_capacity(rendered.len());
    for (position, frame) in rendered.into_iter().enumerate() {
        if let Some(expected) = expected {
            if frame.dimensions() != expected {
                warn!(
                    "Skipping frame {} of '{}': size {} differs from {}",
                    position,
                    name,
                    frame.dimensions(),
                    expected
                );
                continue;
            }
        }
        frames.push(if tint {
            frame.tinted(Color::tint_for(position))
        } else {
            frame
        });
    }

    match Animation::new(name, frames) {
        Ok(animation) => {
            info!(
                "Rendered '{}' from {}: {} frames at {}",
                name,
                source.describe(),
                animation.len(),
                animation.dimensions()
            );
            animation.with_tier(pipeline.resizer().rows())
        }
        Err(e) => {
            warn!("No usable frames for '{}': {}", name, e);
            placeholder(name)
        }
    }
}

/// Open `path` as a frame source and render it.
///
/// A source that cannot be opened at all also yields the placeholder.
pub fn load_live(name: &str, path: &Path, pipeline: &FramePipeline, tint: bool) -> Animation {
    match open_source(path) {
        Ok(mut source) => animate_source(name, source.as_mut(), pipeline, tint),
        Err(e) => {
            warn!("Cannot open source '{}' for '{}': {}", path.display(), name, e);
            placeholder(name)
        }
    }
}
