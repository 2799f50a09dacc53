//! # ascii-video-render
//!
//! Pixel-to-glyph rendering engine for the ASCII video server.
//!
//! This crate provides:
//! - Frame sources delivering raw pixel grids (image sequences, ffmpeg-decoded video)
//! - Aspect-corrected resizing to a character grid
//! - Glyph mapping strategies (color, monochrome, filled)
//! - Glyph grid serialization with color-run coalescing
//! - Escape-aware measurement of pre-rendered frame text
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on ascii-video-core
//! and turns pixels into rendered frames.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod grid;
pub mod mapper;
pub mod measure;
pub mod pipeline;
pub mod resize;
pub mod source;
pub mod video;

// Re-export commonly used types
pub use grid::GlyphGrid;
pub use mapper::RenderStrategy;
pub use measure::measure;
pub use pipeline::FramePipeline;
pub use resize::Resizer;
pub use source::{open_source, Frame, FrameSource, ImageSequenceSource};
pub use video::{VideoInfo, VideoSource};
