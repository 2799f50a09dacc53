//! # ascii-video-stream
//!
//! Animation streaming for the ASCII video server.
//!
//! This crate provides:
//! - Strided frame selection
//! - Emission framing (preamble, per-tick frame text, teardown)
//! - Stream sessions: infinite timed playback with cancellation and
//!   terminal cleanup on every exit path
//!
//! ## Architecture
//!
//! This is Layer 3 in the architecture - it depends on ascii-video-core
//! and streams animations produced by ascii-video-store.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod emission;
pub mod selection;
pub mod session;

// Re-export commonly used types
pub use emission::{format_interval, tick};
pub use selection::Selection;
pub use session::{SessionReport, StreamSession};
