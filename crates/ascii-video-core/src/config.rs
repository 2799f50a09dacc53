//! Configuration types for the ASCII video server.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::params::{DEFAULT_INTERVAL, DEFAULT_STRIDE};
use crate::{ColorMode, Error, StreamParams};

/// Server configuration loaded from YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Server settings
    pub server: ServerSettings,
    /// Asset (frame store) settings
    pub assets: AssetSettings,
    /// Rendering settings for live decoding and builds
    pub render: RenderSettings,
    /// Stream defaults
    pub stream: StreamSettings,
}

impl ServerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: ServerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("server.port must be > 0".to_string()));
        }

        if self.server.default_animation.trim().is_empty() {
            return Err(Error::Config(
                "server.default_animation cannot be empty".to_string(),
            ));
        }

        if self.server.redirect_url.trim().is_empty() {
            return Err(Error::Config(
                "server.redirect_url cannot be empty".to_string(),
            ));
        }

        if self.render.height == 0 {
            return Err(Error::Config("render.height must be > 0".to_string()));
        }

        for source in &self.assets.live_sources {
            source.validate()?;
        }

        Ok(())
    }

    /// Stream parameters used when a request does not specify its own.
    pub fn stream_defaults(&self) -> StreamParams {
        StreamParams::new(
            self.stream.default_interval,
            self.stream.default_stride as i64,
        )
    }
}

/// Server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind
    pub bind: String,
    /// Port to listen on
    pub port: u16,
    /// Where non-terminal clients are redirected
    pub redirect_url: String,
    /// Animation served at `/`
    pub default_animation: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8081,
            redirect_url: "https://github.com/woduq1414/ascii-video-terminal".to_string(),
            default_animation: "overdrive".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Frame store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Root directory holding one sub-directory per animation
    pub root: PathBuf,
    /// Apply the rotating color tint to precomputed frames
    pub tint_precomputed: bool,
    /// Load every discovered animation at startup instead of on first request
    pub preload: bool,
    /// Sources decoded through the renderer at startup
    pub live_sources: Vec<LiveSource>,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("saved_frames"),
            tint_precomputed: true,
            preload: false,
            live_sources: vec![],
        }
    }
}

/// A video or image sequence rendered live into a named animation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveSource {
    /// Animation name (single URL path segment)
    pub name: String,
    /// Video file or directory of still images
    pub path: PathBuf,
}

impl LiveSource {
    /// Validate the source definition.
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("live source name cannot be empty".to_string()));
        }

        if self.name.contains('/') {
            return Err(Error::Config(format!(
                "live source name '{}' cannot contain '/'",
                self.name
            )));
        }

        Ok(())
    }
}

/// Rendering strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Solid glyph colored with the pixel
    #[default]
    Color,
    /// Density ramp, no color
    Monochrome,
    /// Density ramp plus color, bold
    Filled,
}

impl std::str::FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "color" | "ascii-color" | "default" => Ok(StrategyKind::Color),
            "monochrome" | "just-ascii" | "bw" => Ok(StrategyKind::Monochrome),
            "filled" | "filled-ascii" => Ok(StrategyKind::Filled),
            other => Err(Error::Config(format!("unknown render strategy '{other}'"))),
        }
    }
}

/// Rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Strategy used for live sources
    pub strategy: StrategyKind,
    /// Target character-grid height
    pub height: u16,
    /// How pixel colors are encoded
    pub color_mode: ColorMode,
    /// Apply the rotating tint to live-rendered frames too
    pub tint_live: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Color,
            height: 50,
            color_mode: ColorMode::TrueColor,
            tint_live: false,
        }
    }
}

/// Stream defaults, clamped like request parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    /// Seconds between frames
    pub default_interval: f64,
    /// Frame sampling stride
    pub default_stride: u32,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            default_interval: DEFAULT_INTERVAL,
            default_stride: DEFAULT_STRIDE as u32,
        }
    }
}
