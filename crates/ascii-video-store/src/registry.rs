//! Memoizing registry of animations shared by all streaming sessions.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use ascii_video_core::{Animation, AssetSettings, LiveSource};
use ascii_video_render::FramePipeline;

use crate::discover::discover;
use crate::live::load_live;
use crate::placeholder::unknown_animation;
use crate::precomputed::{list_frame_files, load_precomputed};

/// Outcome of looking up an animation by name.
#[derive(Debug, Clone)]
pub enum Resolved {
    /// A registered or stored animation
    Found(Arc<Animation>),
    /// The in-band error animation for an unknown name
    Unknown(Arc<Animation>),
}

impl Resolved {
    /// The animation to stream, whichever variant this is.
    pub fn animation(&self) -> &Arc<Animation> {
        match self {
            Resolved::Found(animation) | Resolved::Unknown(animation) => animation,
        }
    }

    /// Check whether the name was known.
    pub fn is_found(&self) -> bool {
        matches!(self, Resolved::Found(_))
    }
}

/// Registry of animations, loaded at most once per name.
///
/// Animations are immutable once inserted and handed out as `Arc`s, so
/// sessions read them without holding the lock.
pub struct AnimationRegistry {
    root: PathBuf,
    tint_precomputed: bool,
    animations: Arc<RwLock<HashMap<String, Arc<Animation>>>>,
}

impl AnimationRegistry {
    /// Create a registry reading precomputed frames under `root`.
    pub fn new(root: impl Into<PathBuf>, tint_precomputed: bool) -> Self {
        Self {
            root: root.into(),
            tint_precomputed,
            animations: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a registry from asset settings.
    pub fn from_settings(settings: &AssetSettings) -> Self {
        Self::new(settings.root.clone(), settings.tint_precomputed)
    }

    /// Insert an animation under its own name, replacing any previous one.
    pub fn register(&self, animation: Animation) -> Arc<Animation> {
        let animation = Arc::new(animation);
        let mut animations = self
            .animations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        animations.insert(animation.name().to_string(), Arc::clone(&animation));
        animation
    }

    /// Render and register every live source.
    pub fn register_live_sources(
        &self,
        sources: &[LiveSource],
        pipeline: &FramePipeline,
        tint: bool,
    ) -> usize {
        for source in sources {
            let animation = load_live(&source.name, &source.path, pipeline, tint);
            self.register(animation);
        }
        sources.len()
    }

    /// Load every animation found under the root.
    pub fn preload(&self) -> usize {
        let names = self.stored_names();
        let mut loaded = 0;
        for name in &names {
            if self.resolve(name).is_found() {
                loaded += 1;
            }
        }
        info!("Preloaded {} animations", loaded);
        loaded
    }

    /// Names of animations stored under the root.
    fn stored_names(&self) -> Vec<String> {
        discover(&self.root).unwrap_or_else(|e| {
            warn!("Cannot scan '{}': {}", self.root.display(), e);
            Vec::new()
        })
    }

    /// Every name that resolves: stored directories plus registered animations, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names = self.stored_names();
        {
            let animations = self
                .animations
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            names.extend(animations.keys().cloned());
        }
        names.sort();
        names.dedup();
        names
    }

    /// Get a cached animation without touching the disk.
    pub fn get(&self, name: &str) -> Option<Arc<Animation>> {
        let animations = self
            .animations
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        animations.get(name).cloned()
    }

    /// Get the number of loaded animations.
    pub fn loaded_count(&self) -> usize {
        let animations = self
            .animations
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        animations.len()
    }

    /// Directory holding `name`, if it is a safe single path segment with frames in it.
    fn stored_dir(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains(&['/', '\\'][..]) {
            return None;
        }
        let dir = self.root.join(name);
        match list_frame_files(&dir) {
            Ok(files) if !files.is_empty() => Some(dir),
            _ => None,
        }
    }

    /// Look up `name`, loading it from disk on first use.
    ///
    /// Unknown names resolve to a single-frame error animation listing the
    /// known names; this never fails.
    pub fn resolve(&self, name: &str) -> Resolved {
        if let Some(animation) = self.get(name) {
            return Resolved::Found(animation);
        }

        let Some(dir) = self.stored_dir(name) else {
            debug!("Unknown animation '{}'", name);
            return Resolved::Unknown(Arc::new(unknown_animation(name, &self.names())));
        };

        let loaded = Arc::new(load_precomputed(&dir, name, self.tint_precomputed));
        let mut animations = self
            .animations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Another caller may have loaded it meanwhile; keep the first.
        let animation = animations
            .entry(name.to_string())
            .or_insert(loaded)
            .clone();
        Resolved::Found(animation)
    }
}
