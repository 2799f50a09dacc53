//! # ascii-video-store
//!
//! Frame store for the ASCII video server.
//!
//! This crate provides:
//! - Loading precomputed frame directories (`frame_NNNNNN.txt`)
//! - Live decoding of video files and image sequences into animations
//! - Asset build jobs that persist rendered frames, optionally at several resolution tiers
//! - Discovery of available animations under the asset root
//! - A memoizing registry shared by all streaming sessions
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on ascii-video-core
//! and ascii-video-render.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod build;
pub mod discover;
pub mod live;
pub mod placeholder;
pub mod precomputed;
pub mod registry;

// Re-export commonly used types
pub use build::{build_folder, tier_dir, BuildJob, BuildReport, DEFAULT_TIERS, VIDEO_EXTENSIONS};
pub use discover::discover;
pub use live::load_live;
pub use placeholder::{placeholder, unknown_animation};
pub use precomputed::{frame_file_name, load_precomputed};
pub use registry::{AnimationRegistry, Resolved};
