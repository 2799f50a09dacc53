//! Rendered frames and the animations built from them.

use std::sync::Arc;

use crate::ansi::RESET;
use crate::{Color, Dimensions, Error, Result};

/// A fully composed text frame, ready to be written to a terminal verbatim.
///
/// The body may embed color escape sequences; `dimensions` is its visible
/// character grid. Cloning is cheap, the body is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    body: Arc<str>,
    dimensions: Dimensions,
}

impl RenderedFrame {
    /// Create a frame from its serialized body and visible grid size.
    pub fn new(body: impl Into<Arc<str>>, dimensions: Dimensions) -> Self {
        Self {
            body: body.into(),
            dimensions,
        }
    }

    /// Serialized text, escape sequences included.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Visible grid size.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Wrap the frame in a foreground color, closing with a style reset.
    ///
    /// Escapes already inside the body take precedence over the tint.
    pub fn tinted(&self, color: Color) -> Self {
        Self {
            body: format!("{}{}{RESET}", color.fg_sequence(), self.body).into(),
            dimensions: self.dimensions,
        }
    }
}

/// A named, ordered, immutable, non-empty sequence of rendered frames.
///
/// Built once by the frame store and shared read-only between all sessions.
#[derive(Debug, Clone)]
pub struct Animation {
    name: String,
    frames: Arc<[RenderedFrame]>,
    tier: Option<u16>,
}

impl Animation {
    /// Create an animation, checking that it is non-empty and uniformly sized.
    pub fn new(name: impl Into<String>, frames: Vec<RenderedFrame>) -> Result<Self> {
        let name = name.into();
        let Some(first) = frames.first() else {
            return Err(Error::EmptyAnimation(name));
        };
        let expected = first.dimensions();
        if let Some((index, frame)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.dimensions() != expected)
        {
            return Err(Error::FrameSizeMismatch {
                index,
                expected,
                found: frame.dimensions(),
            });
        }

        Ok(Self {
            name,
            frames: frames.into(),
            tier: None,
        })
    }

    /// Single-frame animation, used for placeholders and in-band errors.
    pub fn single(name: impl Into<String>, frame: RenderedFrame) -> Self {
        Self {
            name: name.into(),
            frames: Arc::from(vec![frame]),
            tier: None,
        }
    }

    /// Tag the animation with the character-grid height it was rendered at.
    pub fn with_tier(mut self, rows: u16) -> Self {
        self.tier = Some(rows);
        self
    }

    /// Animation name as used in URLs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All frames in playback order.
    pub fn frames(&self) -> &[RenderedFrame] {
        &self.frames
    }

    /// Frame at `index`, if any.
    pub fn frame(&self, index: usize) -> Option<&RenderedFrame> {
        self.frames.get(index)
    }

    /// Number of frames (always at least one).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Grid size shared by every frame.
    pub fn dimensions(&self) -> Dimensions {
        self.frames[0].dimensions()
    }

    /// Resolution tier, when known.
    pub fn tier(&self) -> Option<u16> {
        self.tier
    }
}
