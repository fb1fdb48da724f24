use bevy::log::{info, warn};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_CIRCLE_SEGMENTS, DEFAULT_PIXEL_TOLERANCE, DEFAULT_SNAP_TOLERANCE, MAX_PIXEL_TOLERANCE,
    MIN_CIRCLE_SEGMENTS,
};
use crate::geometry::{GeometryType, Style};

/// Draw tool entry of the tool table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub geometry: GeometryType,
    pub min_points: usize,
    #[serde(default)]
    pub style: Style,
    /// Property template copied onto every feature the tool creates
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl ToolConfig {
    pub fn new(geometry: GeometryType, min_points: usize) -> Self {
        Self {
            geometry,
            min_points,
            style: Style::default(),
            properties: serde_json::Map::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: serde_json::Value) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }
}

/// Smallest point count a sketch of this kind can finish with, `None` if it cannot be drawn
pub fn geometry_min_points(geometry: GeometryType) -> Option<usize> {
    match geometry {
        GeometryType::Point => Some(1),
        GeometryType::LineString | GeometryType::Circle => Some(2),
        GeometryType::Polygon => Some(3),
        _ => None,
    }
}

/// Editor configuration persisted to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct EditorConfig {
    /// Hit-test radius in pixels
    #[serde(default = "default_pixel_tolerance")]
    pub pixel_tolerance: f64,

    /// Whether sketch vertices and drags snap to other features
    #[serde(default = "default_snapping")]
    pub snapping: bool,

    #[serde(default = "default_snap_tolerance")]
    pub snap_tolerance: f64,

    /// Segments used to sample circles into polygons on export
    #[serde(default = "default_circle_segments")]
    pub circle_segments: usize,

    #[serde(default = "default_tools")]
    pub tools: BTreeMap<String, ToolConfig>,
}

fn default_pixel_tolerance() -> f64 {
    DEFAULT_PIXEL_TOLERANCE
}

fn default_snapping() -> bool {
    true
}

fn default_snap_tolerance() -> f64 {
    DEFAULT_SNAP_TOLERANCE
}

fn default_circle_segments() -> usize {
    DEFAULT_CIRCLE_SEGMENTS
}

fn default_tools() -> BTreeMap<String, ToolConfig> {
    let mut tools = BTreeMap::new();
    tools.insert("marker".to_string(), ToolConfig::new(GeometryType::Point, 1));
    tools.insert(
        "annotation".to_string(),
        ToolConfig::new(GeometryType::Point, 1).with_property("text", serde_json::json!("")),
    );
    tools.insert("line".to_string(), ToolConfig::new(GeometryType::LineString, 2));
    tools.insert("measure".to_string(), ToolConfig::new(GeometryType::LineString, 2));
    tools.insert("polygon".to_string(), ToolConfig::new(GeometryType::Polygon, 3));
    tools.insert("circle".to_string(), ToolConfig::new(GeometryType::Circle, 2));
    tools
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            pixel_tolerance: default_pixel_tolerance(),
            snapping: default_snapping(),
            snap_tolerance: default_snap_tolerance(),
            circle_segments: default_circle_segments(),
            tools: default_tools(),
        }
    }
}

fn valid_tolerance(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value <= MAX_PIXEL_TOLERANCE
}

impl EditorConfig {
    /// Copy with out-of-range values reset to their defaults and undrawable tools dropped
    pub fn sanitized(mut self) -> Self {
        if !valid_tolerance(self.pixel_tolerance) {
            warn!("Invalid pixel tolerance {}, using default", self.pixel_tolerance);
            self.pixel_tolerance = DEFAULT_PIXEL_TOLERANCE;
        }
        if !valid_tolerance(self.snap_tolerance) {
            warn!("Invalid snap tolerance {}, using default", self.snap_tolerance);
            self.snap_tolerance = DEFAULT_SNAP_TOLERANCE;
        }
        if self.circle_segments < MIN_CIRCLE_SEGMENTS {
            self.circle_segments = DEFAULT_CIRCLE_SEGMENTS;
        }

        self.tools.retain(|name, tool| match geometry_min_points(tool.geometry) {
            Some(minimum) => {
                tool.min_points = tool.min_points.max(minimum);
                // Points and circles take a fixed number of clicks
                if matches!(tool.geometry, GeometryType::Point | GeometryType::Circle) {
                    tool.min_points = minimum;
                }
                true
            }
            None => {
                warn!(
                    "Dropping tool '{}': {} cannot be drawn",
                    name,
                    tool.geometry.display_name()
                );
                false
            }
        });
        self
    }
}

/// Result of loading config from disk
pub struct LoadConfigResult {
    pub config: EditorConfig,
    /// Error message if config was reset to defaults due to an error
    pub reset_reason: Option<String>,
}

/// Load configuration from the platform config file
pub fn load_config() -> LoadConfigResult {
    load_config_from(&crate::paths::config_file())
}

/// Load configuration from `path`; a missing file yields defaults without a reset reason
pub fn load_config_from(path: &Path) -> LoadConfigResult {
    let (config, reset_reason) = if path.exists() {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<EditorConfig>(&json) {
                Ok(config) => {
                    info!("Loaded config from {:?}", path);
                    (config, None)
                }
                Err(e) => {
                    warn!("Failed to parse config file: {}", e);
                    (
                        EditorConfig::default(),
                        Some(format!("Configuration file was corrupted: {}", e)),
                    )
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                (
                    EditorConfig::default(),
                    Some(format!("Could not read configuration file: {}", e)),
                )
            }
        }
    } else {
        info!("No config file found, using defaults");
        (EditorConfig::default(), None)
    };

    LoadConfigResult {
        config: config.sanitized(),
        reset_reason,
    }
}

/// Save configuration to `path`
pub fn save_config(config: &EditorConfig, path: &Path) -> Result<(), String> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    std::fs::write(path, json).map_err(|e| format!("Failed to save config to {:?}: {}", path, e))?;
    info!("Config saved to {:?}", path);
    Ok(())
}
