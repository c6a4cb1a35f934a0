//! Application settings.
//!
//! Settings are persisted as JSON under the XDG config directory and are
//! consumed by the director (zoom planning) and the render engine
//! (compositing style). Every field has a serde default so configs written
//! by older versions keep loading.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Camera and overlay behavior.
    #[serde(default)]
    pub render: RenderSettings,

    /// Output framing (background, corners, shadow, cursor sprite).
    #[serde(default)]
    pub style: StyleSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings that drive the zoom planner and per-frame effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Master switch for the automatic camera. When off, the planner emits
    /// no keyframes and the viewport stays at identity.
    pub auto_zoom_enabled: bool,

    /// Upper bound on per-scene zoom levels.
    pub max_zoom: f64,

    /// Scales every spring half-life used by the planner.
    #[serde(default)]
    pub animation_speed: AnimationSpeed,

    /// Idle gap after which the camera falls back to the window level (ms).
    #[serde(default = "default_zoom_out_idle_ms")]
    pub zoom_out_idle_ms: u64,

    /// Idle gap after which the camera returns to the full overview (ms).
    /// Only honored for full-screen recordings.
    #[serde(default = "default_overview_idle_ms")]
    pub overview_idle_ms: u64,

    pub click_ring_enabled: bool,
    pub key_badge_enabled: bool,
    pub cursor_smoothing: bool,
}

fn default_zoom_out_idle_ms() -> u64 {
    5000
}

fn default_overview_idle_ms() -> u64 {
    8000
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            auto_zoom_enabled: true,
            max_zoom: 3.0,
            animation_speed: AnimationSpeed::default(),
            zoom_out_idle_ms: default_zoom_out_idle_ms(),
            overview_idle_ms: default_overview_idle_ms(),
            click_ring_enabled: true,
            key_badge_enabled: true,
            cursor_smoothing: true,
        }
    }
}

/// Controls animation speed for zoom/pan transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AnimationSpeed {
    Slow,
    #[default]
    Mellow,
    Quick,
    Rapid,
}

impl AnimationSpeed {
    /// Multiplier applied to every planner half-life.
    pub fn speed_scale(&self) -> f64 {
        match self {
            AnimationSpeed::Slow => 1.5,
            AnimationSpeed::Mellow => 1.0,
            AnimationSpeed::Quick => 0.7,
            AnimationSpeed::Rapid => 0.5,
        }
    }
}

/// Output framing style.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleSettings {
    pub background: BackgroundConfig,

    /// Corner radius applied to the content rectangle (px).
    pub border_radius: u32,

    pub shadow_enabled: bool,
    pub shadow_blur: f64,
    pub shadow_offset_y: f64,

    /// Path to a custom cursor PNG (with transparency). If unset or
    /// unreadable, the built-in synthetic cursor sprite is used.
    #[serde(default)]
    pub cursor_image_path: Option<PathBuf>,

    /// Hotspot (tip position) within the custom cursor image.
    #[serde(default)]
    pub cursor_hotspot_x: u32,
    #[serde(default)]
    pub cursor_hotspot_y: u32,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            background: BackgroundConfig::Gradient {
                from: [139, 92, 246],
                to: [59, 130, 246],
                angle: 135.0,
            },
            border_radius: 12,
            shadow_enabled: true,
            shadow_blur: 40.0,
            shadow_offset_y: 10.0,
            cursor_image_path: None,
            cursor_hotspot_x: 0,
            cursor_hotspot_y: 0,
        }
    }
}

/// Background of the output canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BackgroundConfig {
    Gradient { from: [u8; 3], to: [u8; 3], angle: f64 },
    Solid { color: [u8; 3] },
    Transparent,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "retake=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("retake").join("config.json")
}
