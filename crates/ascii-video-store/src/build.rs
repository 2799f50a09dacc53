//! Asset build jobs: decode a source once and persist rendered frames.
//!
//! A job renders every source frame at one or more heights ("resolution
//! tiers") and writes each as `frame_NNNNNN.txt`, the layout the precomputed
//! loader reads back.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use ascii_video_core::{Error, Result};
use ascii_video_render::{open_source, FramePipeline, RenderStrategy};

use crate::precomputed::{frame_file_name, list_frame_files};

/// Heights offered when building every tier.
pub const DEFAULT_TIERS: &[u16] = &[30, 50, 75, 100];

/// Video file extensions picked up by [`build_folder`].
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

/// Log progress every this many frames.
const PROGRESS_EVERY: usize = 10;

/// Output directory for one tier.
///
/// A single-tier job writes `<root>/<name>`; a multi-tier job writes
/// `<root>/<name>-<height>` per tier.
pub fn tier_dir(root: &Path, name: &str, height: u16, multi_tier: bool) -> PathBuf {
    if multi_tier {
        root.join(format!("{name}-{height}"))
    } else {
        root.join(name)
    }
}

/// Result of a finished build job.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    /// Animation name
    pub name: String,
    /// Frames written per tier
    pub frames: usize,
    /// Source items that could not be decoded
    pub skipped: usize,
    /// `(height, directory)` for every tier written
    pub outputs: Vec<(u16, PathBuf)>,
}

/// One source rendered into one or more tiers.
#[derive(Debug, Clone)]
pub struct BuildJob {
    name: String,
    source: PathBuf,
    root: PathBuf,
    heights: Vec<u16>,
    strategy: RenderStrategy,
}

impl BuildJob {
    /// Create a job writing `source` under `root/name`, 50 rows tall.
    pub fn new(
        name: impl Into<String>,
        source: impl Into<PathBuf>,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            root: root.into(),
            heights: vec![50],
            strategy: RenderStrategy::default(),
        }
    }

    /// Set the tier heights. Zero heights and duplicates are dropped.
    pub fn with_heights(mut self, heights: &[u16]) -> Self {
        let mut heights: Vec<u16> = heights.iter().copied().filter(|h| *h > 0).collect();
        heights.sort_unstable();
        heights.dedup();
        if !heights.is_empty() {
            self.heights = heights;
        }
        self
    }

    /// Set the mapping strategy.
    pub fn with_strategy(mut self, strategy: RenderStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Animation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tier heights, ascending.
    pub fn heights(&self) -> &[u16] {
        &self.heights
    }

    /// Decode the source and write every tier.
    ///
    /// Fails when the source cannot be opened, an output cannot be written,
    /// or no frame at all could be decoded.
    pub fn run(&self) -> Result<BuildReport> {
        let mut source = open_source(&self.source)?;
        let multi_tier = self.heights.len() > 1;

        let mut tiers: Vec<(FramePipeline, PathBuf)> = Vec::with_capacity(self.heights.len());
        for &height in &self.heights {
            let dir = tier_dir(&self.root, &self.name, height, multi_tier);
            prepare_dir(&dir)?;
            tiers.push((FramePipeline::new(height, self.strategy), dir));
        }

        let total = source.len_hint();
        info!(
            "Building '{}' from {} into {} tier(s) ({})",
            self.name,
            source.describe(),
            tiers.len(),
            self.strategy.name()
        );

        let mut written = 0usize;
        let mut skipped = 0usize;
        while let Some(item) = source.next_frame() {
            let frame = match item {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("Skipping source frame {}: {}", written + skipped, e);
                    skipped += 1;
                    continue;
                }
            };

            for (pipeline, dir) in &tiers {
                let rendered = pipeline.render(&frame);
                std::fs::write(dir.join(frame_file_name(written)), rendered.body())?;
            }
            written += 1;

            if written % PROGRESS_EVERY == 0 {
                match total {
                    Some(total) => info!("'{}': {}/{} frames", self.name, written, total),
                    None => info!("'{}': {} frames", self.name, written),
                }
            }
        }

        if written == 0 {
            return Err(Error::EmptyAnimation(self.name.clone()));
        }

        info!("Built '{}': {} frames, {} skipped", self.name, written, skipped);

        Ok(BuildReport {
            name: self.name.clone(),
            frames: written,
            skipped,
            outputs: self
                .heights
                .iter()
                .copied()
                .zip(tiers.into_iter().map(|(_, dir)| dir))
                .collect(),
        })
    }
}

/// Create `dir` and remove frame files left by an earlier build.
fn prepare_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let stale = list_frame_files(dir)?;
    if !stale.is_empty() {
        debug!("Removing {} old frames from '{}'", stale.len(), dir.display());
        for path in stale {
            std::fs::remove_file(path)?;
        }
    }
    Ok(())
}

fn is_video(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
}

/// Build every video in `dir`, naming each animation after its file stem.
///
/// Jobs are independent: one failing does not stop the rest.
pub fn build_folder(
    dir: &Path,
    root: &Path,
    heights: &[u16],
    strategy: RenderStrategy,
) -> Result<Vec<(String, Result<BuildReport>)>> {
    let mut videos: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_video(path))
        .collect();
    videos.sort();

    info!("Found {} videos in '{}'", videos.len(), dir.display());

    let results = videos
        .into_iter()
        .filter_map(|path| {
            let name = path.file_stem()?.to_str()?.to_string();
            let result = BuildJob::new(name.clone(), &path, root)
                .with_heights(heights)
                .with_strategy(strategy)
                .run();
            if let Err(e) = &result {
                warn!("Build of '{}' failed: {}", name, e);
            }
            Some((name, result))
        })
        .collect();

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ascii-video-{tag}-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_stills(dir: &Path, count: usize) {
        for i in 0..count {
            RgbImage::from_pixel(20, 10, Rgb([(i * 20) as u8, 0, 0]))
                .save(dir.join(format!("{i:03}.png")))
                .unwrap();
        }
    }

    #[test]
    fn test_tier_dir_naming() {
        let root = Path::new("saved");
        assert_eq!(tier_dir(root, "clip", 50, false), root.join("clip"));
        assert_eq!(tier_dir(root, "clip", 75, true), root.join("clip-75"));
    }

    #[test]
    fn test_with_heights_normalizes() {
        let job = BuildJob::new("a", "src", "root").with_heights(&[75, 0, 30, 75]);
        assert_eq!(job.heights(), &[30, 75]);
        let job = BuildJob::new("a", "src", "root").with_heights(&[0]);
        assert_eq!(job.heights(), &[50]);
    }

    #[test]
    fn test_single_tier_build() {
        let src = temp_dir("build-src");
        let root = temp_dir("build-root");
        write_stills(&src, 3);

        let report = BuildJob::new("stills", &src, &root)
            .with_heights(&[5])
            .run()
            .unwrap();
        assert_eq!(report.frames, 3);
        assert_eq!(report.outputs, vec![(5, root.join("stills"))]);
        assert!(root.join("stills").join("frame_000002.txt").is_file());
        assert!(!root.join("stills").join("frame_000003.txt").exists());

        std::fs::remove_dir_all(src).ok();
        std::fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_multi_tier_build() {
        let src = temp_dir("build-src");
        let root = temp_dir("build-root");
        write_stills(&src, 2);

        let report = BuildJob::new("stills", &src, &root)
            .with_heights(&[4, 2])
            .run()
            .unwrap();
        assert_eq!(report.outputs.len(), 2);
        let small = std::fs::read_to_string(root.join("stills-2").join("frame_000000.txt")).unwrap();
        assert_eq!(small.matches('\n').count(), 2);
        assert!(root.join("stills-4").join("frame_000001.txt").is_file());

        std::fs::remove_dir_all(src).ok();
        std::fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_rebuild_removes_stale_frames() {
        let src = temp_dir("build-src");
        let root = temp_dir("build-root");
        let out = root.join("stills");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join(frame_file_name(9)), "old").unwrap();
        write_stills(&src, 1);

        BuildJob::new("stills", &src, &root)
            .with_heights(&[3])
            .run()
            .unwrap();
        assert!(!out.join(frame_file_name(9)).exists());

        std::fs::remove_dir_all(src).ok();
        std::fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_missing_source_fails_job() {
        let root = temp_dir("build-root");
        let result = BuildJob::new("ghost", "/definitely/not/here.mp4", &root).run();
        assert!(result.is_err());
        std::fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_empty_source_fails_job() {
        let src = temp_dir("build-src");
        let root = temp_dir("build-root");
        let result = BuildJob::new("empty", &src, &root).run();
        assert!(matches!(result, Err(Error::EmptyAnimation(_))));
        std::fs::remove_dir_all(src).ok();
        std::fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_build_folder_ignores_non_videos() {
        let dir = temp_dir("build-folder");
        let root = temp_dir("build-root");
        std::fs::write(dir.join("readme.txt"), "x").unwrap();
        std::fs::write(dir.join("broken.mp4"), "not a video").unwrap();

        let results = build_folder(&dir, &root, &[10], RenderStrategy::default()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "broken");
        assert!(results[0].1.is_err());

        std::fs::remove_dir_all(dir).ok();
        std::fs::remove_dir_all(root).ok();
    }
}
