//! Viewer configuration: model placement, camera, marker styling and the sensor catalog
//!
//! Configuration is read from a TOML file. Every section is optional; missing
//! sections and fields fall back to the built-in defaults, which reproduce the
//! stock vehicle with its four sensors.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Duplicate sensor id: {0}")]
    DuplicateSensorId(u32),
    #[error("Sensor {0} has an empty name")]
    EmptySensorName(u32),
    #[error("Sensor {id} has an invalid shape: {reason}")]
    InvalidShape { id: u32, reason: String },
    #[error("Invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),
    #[error("Invalid camera distance range: min {min} must be positive and below max {max}")]
    InvalidDistanceRange { min: f32, max: f32 },
    #[error("Invalid gizmo setting: {0}")]
    InvalidGizmo(String),
    #[error("Invalid model scale {0}, must be positive")]
    InvalidModelScale(f32),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub markers: MarkerStyleConfig,
    #[serde(default)]
    pub gizmo: GizmoConfig,
    /// Sensor catalog, in display order
    #[serde(default = "default_sensors", rename = "sensor")]
    pub sensors: Vec<SensorSpec>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            camera: CameraConfig::default(),
            markers: MarkerStyleConfig::default(),
            gizmo: GizmoConfig::default(),
            sensors: default_sensors(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// glTF/GLB asset path, relative to the asset root
    #[serde(default = "default_model_path")]
    pub path: String,
    /// Uniform scale applied to the model root
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Model root translation
    #[serde(default)]
    pub position: [f32; 3],
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            scale: default_scale(),
            position: [0.0, 0.0, 0.0],
        }
    }
}

fn default_model_path() -> String {
    "models/car.glb".to_string()
}

fn default_scale() -> f32 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    /// Orbit pivot; the camera looks at the center of the model
    #[serde(default = "default_camera_target")]
    pub target: [f32; 3],
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "default_min_distance")]
    pub min_distance: f32,
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            target: default_camera_target(),
            fov_degrees: default_fov(),
            min_distance: default_min_distance(),
            max_distance: default_max_distance(),
        }
    }
}

fn default_camera_position() -> [f32; 3] {
    [4.0, 5.0, 7.0]
}

fn default_camera_target() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn default_fov() -> f32 {
    75.0
}

fn default_min_distance() -> f32 {
    2.0
}

fn default_max_distance() -> f32 {
    20.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerStyleConfig {
    /// Sphere radius used by sensors that do not declare a shape
    #[serde(default = "default_marker_radius")]
    pub radius: f32,
    #[serde(default = "default_normal_color")]
    pub normal_color: String,
    #[serde(default = "default_hovered_color")]
    pub hovered_color: String,
    #[serde(default = "default_selected_color")]
    pub selected_color: String,
}

impl Default for MarkerStyleConfig {
    fn default() -> Self {
        Self {
            radius: default_marker_radius(),
            normal_color: default_normal_color(),
            hovered_color: default_hovered_color(),
            selected_color: default_selected_color(),
        }
    }
}

fn default_marker_radius() -> f32 {
    0.1
}

fn default_normal_color() -> String {
    "#00aaff".to_string()
}

fn default_hovered_color() -> String {
    "#66ccff".to_string()
}

fn default_selected_color() -> String {
    "#ffaa00".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GizmoConfig {
    /// Length of each axis handle in world units
    #[serde(default = "default_gizmo_size")]
    pub size: f32,
    /// Maximum ray-to-handle distance that still grabs the handle
    #[serde(default = "default_gizmo_pick_radius")]
    pub pick_radius: f32,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            size: default_gizmo_size(),
            pick_radius: default_gizmo_pick_radius(),
        }
    }
}

fn default_gizmo_size() -> f32 {
    0.6
}

fn default_gizmo_pick_radius() -> f32 {
    0.05
}

/// One sensor marker in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSpec {
    pub id: u32,
    pub name: String,
    /// Position relative to the model root
    pub position: [f32; 3],
    /// Sphere radius; falls back to `[markers] radius`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    /// Box half extents; mutually exclusive with `radius`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_extents: Option<[f32; 3]>,
}

/// Pickable geometry of a sensor, centered on its position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorGeometry {
    Sphere { radius: f32 },
    Box { half_extents: [f32; 3] },
}

impl SensorSpec {
    pub fn new(id: u32, name: &str, position: [f32; 3]) -> Self {
        Self {
            id,
            name: name.to_string(),
            position,
            radius: None,
            half_extents: None,
        }
    }

    /// Resolve the sensor's geometry against the default marker radius
    pub fn geometry(&self, default_radius: f32) -> SensorGeometry {
        match (self.half_extents, self.radius) {
            (Some(half_extents), _) => SensorGeometry::Box { half_extents },
            (None, Some(radius)) => SensorGeometry::Sphere { radius },
            (None, None) => SensorGeometry::Sphere { radius: default_radius },
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptySensorName(self.id));
        }
        if self.radius.is_some() && self.half_extents.is_some() {
            return Err(ConfigError::InvalidShape {
                id: self.id,
                reason: "radius and half_extents are mutually exclusive".to_string(),
            });
        }
        if let Some(radius) = self.radius {
            if !(radius > 0.0) {
                return Err(ConfigError::InvalidShape {
                    id: self.id,
                    reason: format!("radius must be positive, got {}", radius),
                });
            }
        }
        if let Some(extents) = self.half_extents {
            if extents.iter().any(|e| !(*e > 0.0)) {
                return Err(ConfigError::InvalidShape {
                    id: self.id,
                    reason: format!("half extents must be positive, got {:?}", extents),
                });
            }
        }
        Ok(())
    }
}

fn default_sensors() -> Vec<SensorSpec> {
    vec![
        SensorSpec::new(1, "Oxygen sensor (lambda probe)", [3.5, 1.0, 0.0]),
        SensorSpec::new(2, "Mass air flow sensor", [-2.0, 2.5, 1.0]),
        SensorSpec::new(3, "Crankshaft position sensor", [0.0, 0.8, -1.2]),
        SensorSpec::new(4, "Knock sensor", [3.0, 1.0, 1.2]),
    ]
}

impl ViewerConfig {
    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check catalog and setting invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for sensor in &self.sensors {
            if !seen.insert(sensor.id) {
                return Err(ConfigError::DuplicateSensorId(sensor.id));
            }
            sensor.validate()?;
        }

        if !(self.model.scale > 0.0) || !self.model.scale.is_finite() {
            return Err(ConfigError::InvalidModelScale(self.model.scale));
        }

        if !(self.markers.radius > 0.0) {
            return Err(ConfigError::InvalidShape {
                id: 0,
                reason: format!("default marker radius must be positive, got {}", self.markers.radius),
            });
        }
        parse_hex_color(&self.markers.normal_color)?;
        parse_hex_color(&self.markers.hovered_color)?;
        parse_hex_color(&self.markers.selected_color)?;

        let camera = &self.camera;
        if !(camera.min_distance > 0.0) || camera.min_distance >= camera.max_distance {
            return Err(ConfigError::InvalidDistanceRange {
                min: camera.min_distance,
                max: camera.max_distance,
            });
        }

        if !(self.gizmo.size > 0.0) {
            return Err(ConfigError::InvalidGizmo(format!("size must be positive, got {}", self.gizmo.size)));
        }
        if !(self.gizmo.pick_radius > 0.0) {
            return Err(ConfigError::InvalidGizmo(format!(
                "pick_radius must be positive, got {}",
                self.gizmo.pick_radius
            )));
        }

        Ok(())
    }

    /// Look up a sensor by id
    pub fn sensor(&self, id: u32) -> Option<&SensorSpec> {
        self.sensors.iter().find(|s| s.id == id)
    }
}

/// Parse a `#rrggbb` color into linear-agnostic sRGB components in 0.0-1.0
pub fn parse_hex_color(text: &str) -> Result<[f32; 3], ConfigError> {
    let hex = text
        .strip_prefix('#')
        .filter(|h| h.len() == 6 && h.is_ascii())
        .ok_or_else(|| ConfigError::InvalidColor(text.to_string()))?;

    let mut rgb = [0.0; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| ConfigError::InvalidColor(text.to_string()))?;
        *channel = byte as f32 / 255.0;
    }
    Ok(rgb)
}

/// Load configuration from file, or the defaults when the file does not exist
pub fn load_config(path: &Path) -> Result<ViewerConfig, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config = ViewerConfig::from_toml_str(&content)?;
        info!(path = %path.display(), sensors = config.sensors.len(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(ViewerConfig::default())
    }
}

/// Save the default configuration to file
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(&ViewerConfig::default())?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = ViewerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.sensors.len(), 4);
        assert_eq!(config.sensor(1).unwrap().position, [3.5, 1.0, 0.0]);
        assert_eq!(config.model.path, "models/car.glb");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = ViewerConfig::from_toml_str(
            r#"
            [camera]
            fov_degrees = 60.0

            [[sensor]]
            id = 7
            name = "Rain sensor"
            position = [0.5, 1.4, 0.0]
            half_extents = [0.05, 0.02, 0.05]
            "#,
        )
        .unwrap();

        assert_eq!(config.camera.fov_degrees, 60.0);
        assert_eq!(config.camera.max_distance, 20.0);
        assert_eq!(config.sensors.len(), 1);
        assert_eq!(
            config.sensors[0].geometry(config.markers.radius),
            SensorGeometry::Box { half_extents: [0.05, 0.02, 0.05] }
        );
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = ViewerConfig::from_toml_str(
            r#"
            [[sensor]]
            id = 1
            name = "A"
            position = [0.0, 0.0, 0.0]

            [[sensor]]
            id = 1
            name = "B"
            position = [1.0, 0.0, 0.0]
            "#,
        );
        assert!(matches!(result, Err(ConfigError::DuplicateSensorId(1))));
    }

    #[test]
    fn test_conflicting_shape_rejected() {
        let mut config = ViewerConfig::default();
        config.sensors[0].radius = Some(0.2);
        config.sensors[0].half_extents = Some([0.1, 0.1, 0.1]);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidShape { id: 1, .. })));
    }

    #[test]
    fn test_distance_range_rejected() {
        let mut config = ViewerConfig::default();
        config.camera.min_distance = 30.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDistanceRange { .. })
        ));
    }

    #[test]
    fn test_model_scale_must_be_positive() {
        for scale in [0.0, -1.0, f32::NAN] {
            let mut config = ViewerConfig::default();
            config.model.scale = scale;
            assert!(matches!(config.validate(), Err(ConfigError::InvalidModelScale(_))));
        }

        let result = ViewerConfig::from_toml_str("[model]\nscale = 0.0\n");
        assert!(matches!(result, Err(ConfigError::InvalidModelScale(_))));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000").unwrap(), [1.0, 0.0, 0.0]);
        assert!(parse_hex_color("ff0000").is_err());
        assert!(parse_hex_color("#ff00").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(&temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.sensors, ViewerConfig::default().sensors);
    }

    #[test]
    fn test_save_and_load_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conf").join("probeview.toml");
        save_default_config(&path).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.sensors.len(), 4);
        assert_eq!(config.markers.selected_color, "#ffaa00");
    }
}
