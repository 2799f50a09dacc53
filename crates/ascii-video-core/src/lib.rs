//! # ascii-video-core
//!
//! Core types for the ASCII video server.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other ascii-video crates. It provides:
//!
//! - Glyph cell and color types for rendered frames
//! - Terminal control sequences used by the renderer and the streamer
//! - Rendered frame and animation types
//! - Stream parameters (interval, stride) with clamping
//! - Session types (SessionId, SessionStatus)
//! - Configuration and error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other ascii-video crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ansi;
pub mod cell;
pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod params;
pub mod session;

// Re-export commonly used types
pub use cell::{CellAttributes, Color, ColorMode, GlyphCell};
pub use config::{
    AssetSettings, LiveSource, RenderSettings, ServerConfig, ServerSettings, StreamSettings,
    StrategyKind,
};
pub use error::{Error, Result};
pub use frame::{Animation, RenderedFrame};
pub use geometry::Dimensions;
pub use params::{StreamParams, Stride};
pub use session::{SessionId, SessionStatus};
