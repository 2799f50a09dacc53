//! Discovery of animation directories under the asset root.

use std::path::Path;

use tracing::debug;

use ascii_video_core::Result;

use crate::precomputed::list_frame_files;

/// Names of the directories under `root` holding at least one frame file, sorted.
///
/// A missing root is treated as empty.
pub fn discover(root: &Path) -> Result<Vec<String>> {
    if !root.is_dir() {
        debug!("Asset root '{}' does not exist", root.display());
        return Ok(Vec::new());
    }

    let mut names: Vec<String> = std::fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter(|entry| {
            list_frame_files(&entry.path())
                .map(|files| !files.is_empty())
                .unwrap_or(false)
        })
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();
    names.sort();

    Ok(names)
}
