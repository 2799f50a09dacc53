//! Frame sources: collaborators that deliver raw pixel grids in order.

use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::debug;

use ascii_video_core::{Error, Result};

use crate::video::VideoSource;

/// A height x width grid of 8-bit RGB pixels.
pub type Frame = RgbImage;

/// Still-image extensions picked up by [`ImageSequenceSource`].
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp", "tif", "tiff"];

/// Ordered producer of raw frames.
///
/// `None` ends the sequence. `Some(Err(_))` reports a fault in one item; callers
/// may skip it and keep pulling.
pub trait FrameSource {
    /// Pull the next frame.
    fn next_frame(&mut self) -> Option<Result<Frame>>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;

    /// Expected number of frames, when the source knows it.
    fn len_hint(&self) -> Option<usize> {
        None
    }
}

/// A directory of still images read in filename order.
#[derive(Debug)]
pub struct ImageSequenceSource {
    dir: PathBuf,
    paths: Vec<PathBuf>,
    next: usize,
}

impl ImageSequenceSource {
    /// Scan `dir` for still images.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(Error::AssetNotFound(dir));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_image_extension(path))
            .collect();
        paths.sort();

        debug!("Found {} images in '{}'", paths.len(), dir.display());

        Ok(Self {
            dir,
            paths,
            next: 0,
        })
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Option<Result<Frame>> {
        let path = self.paths.get(self.next)?;
        self.next += 1;

        let frame = image::open(path)
            .map(|img| img.to_rgb8())
            .map_err(|e| Error::Decode(format!("{}: {e}", path.display())));
        Some(frame)
    }

    fn describe(&self) -> String {
        format!("image sequence '{}'", self.dir.display())
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.paths.len())
    }
}

/// Open a frame source for `path`: a directory becomes an image sequence,
/// anything else is decoded as video.
pub fn open_source(path: impl AsRef<Path>) -> Result<Box<dyn FrameSource + Send>> {
    let path = path.as_ref();
    if path.is_dir() {
        Ok(Box::new(ImageSequenceSource::open(path)?))
    } else if path.is_file() {
        Ok(Box::new(VideoSource::open(path)?))
    } else {
        Err(Error::AssetNotFound(path.to_path_buf()))
    }
}
