//! Loading precomputed frame directories.
//!
//! An animation directory holds `frame_000000.txt`, `frame_000001.txt`, ...
//! Each file is an opaque rendered frame body that may embed color escapes.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use ascii_video_core::{Animation, Color, Dimensions, RenderedFrame, Result};
use ascii_video_render::measure;

use crate::placeholder::placeholder;

/// File name prefix of a precomputed frame.
pub const FRAME_PREFIX: &str = "frame_";

/// File name suffix of a precomputed frame.
pub const FRAME_SUFFIX: &str = ".txt";

/// File name for the frame at `index`.
pub fn frame_file_name(index: usize) -> String {
    format!("{FRAME_PREFIX}{index:06}{FRAME_SUFFIX}")
}

/// Numeric index encoded in a frame file name, if it is one.
pub fn frame_index(path: &Path) -> Option<u64> {
    let name = path.file_name()?.to_str()?;
    let digits = name.strip_prefix(FRAME_PREFIX)?.strip_suffix(FRAME_SUFFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Frame files in `dir`, in ascending numeric order.
pub fn list_frame_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut indexed: Vec<(u64, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter_map(|path| frame_index(&path).map(|idx| (idx, path)))
        .filter(|(_, path)| path.is_file())
        .collect();
    indexed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    Ok(indexed.into_iter().map(|(_, path)| path).collect())
}

/// The grid size shared by the most frames; ties go to the size seen first.
pub fn dominant_dimensions<I>(sizes: I) -> Option<Dimensions>
where
    I: IntoIterator<Item = Dimensions>,
{
    let mut counts: Vec<(Dimensions, usize)> = Vec::new();
    for dims in sizes {
        match counts.iter_mut().find(|(seen, _)| *seen == dims) {
            Some((_, count)) => *count += 1,
            None => counts.push((dims, 1)),
        }
    }

    let mut best: Option<(Dimensions, usize)> = None;
    for (dims, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((dims, count));
        }
    }
    best.map(|(dims, _)| dims)
}

/// Read every frame file in `dir`.
///
/// Unreadable or empty files are skipped with a warning, as are files whose
/// size differs from the size most frames share.
/// With `tint`, frame `i` of the file list is wrapped in the `i`-th palette color.
pub fn load_frames(dir: &Path, tint: bool) -> Vec<RenderedFrame> {
    let files = match list_frame_files(dir) {
        Ok(files) => files,
        Err(e) => {
            warn!("Cannot list frames in '{}': {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut readable: Vec<(usize, &PathBuf, String, Dimensions)> = Vec::with_capacity(files.len());
    for (position, path) in files.iter().enumerate() {
        let body = match std::fs::read_to_string(path) {
            Ok(body) => body,
            Err(e) => {
                warn!("Skipping frame '{}': {}", path.display(), e);
                continue;
            }
        };

        let dims = measure(&body);
        if dims.is_empty() {
            warn!("Skipping empty frame '{}'", path.display());
            continue;
        }
        readable.push((position, path, body, dims));
    }

    let Some(expected) = dominant_dimensions(readable.iter().map(|(_, _, _, dims)| *dims)) else {
        return Vec::new();
    };

    let mut frames = Vec::with_capacity(readable.len());
    for (position, path, body, dims) in readable {
        if dims != expected {
            warn!(
                "Skipping frame '{}': size {} differs from {}",
                path.display(),
                dims,
                expected
            );
            continue;
        }

        let frame = RenderedFrame::new(body, dims);
        frames.push(if tint {
            frame.tinted(Color::tint_for(position))
        } else {
            frame
        });
    }

    debug!(
        "Read {} of {} frame files from '{}'",
        frames.len(),
        files.len(),
        dir.display()
    );
    frames
}

/// Load the animation stored in `dir` under `name`.
///
/// Never fails: a directory with no usable frames yields the placeholder.
pub fn load_precomputed(dir: &Path, name: &str, tint: bool) -> Animation {
    let frames = load_frames(dir, tint);
    if frames.is_empty() {
        warn!("No frames for '{}' in '{}'", name, dir.display());
        return placeholder(name);
    }

    match Animation::new(name, frames) {
        Ok(animation) => {
            info!(
                "Loaded animation '{}': {} frames at {}",
                name,
                animation.len(),
                animation.dimensions()
            );
            animation
        }
        Err(e) => {
            warn!("Discarding animation '{}': {}", name, e);
            placeholder(name)
        }
    }
}
