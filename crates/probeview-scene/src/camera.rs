//! Camera controls, orbit navigation, and pick rays

use bevy::prelude::*;
use probeview_core::config::CameraConfig;

/// Anything that can turn a normalized device coordinate into a world ray
pub trait PickCamera {
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray3d>;
}

/// View and projection matrices of a camera, enough to build pick rays.
///
/// Projections use Bevy's reverse-Z convention: NDC depth 1 is the near
/// plane and depth approaching 0 is the far plane.
#[derive(Debug, Clone, Copy)]
pub struct CameraRig {
    world_from_clip: Mat4,
}

impl CameraRig {
    pub fn new(world_from_view: Mat4, clip_from_view: Mat4) -> Self {
        Self {
            world_from_clip: world_from_view * clip_from_view.inverse(),
        }
    }

    /// Y-up perspective camera at `eye` looking at `target`
    pub fn perspective(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32, near: f32) -> Self {
        let world_from_view = Mat4::look_at_rh(eye, target, Vec3::Y).inverse();
        let clip_from_view = Mat4::perspective_infinite_reverse_rh(fov_y, aspect, near);
        Self::new(world_from_view, clip_from_view)
    }
}

impl PickCamera for CameraRig {
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray3d> {
        let near = self.world_from_clip.project_point3(ndc.extend(1.0));
        let far = self.world_from_clip.project_point3(ndc.extend(f32::EPSILON));
        if !near.is_finite() || !far.is_finite() {
            return None;
        }
        let direction = Dir3::new(far - near).ok()?;
        Some(Ray3d::new(near, direction))
    }
}

/// Camera controller settings
#[derive(Debug, Clone, Resource)]
pub struct CameraSettings {
    pub distance: f32,
    pub target_distance: f32,
    pub azimuth: f32,
    pub elevation: f32,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl CameraSettings {
    /// Derive orbit angles from a configured eye position and pivot (Y up)
    pub fn from_config(config: &CameraConfig) -> Self {
        let target = Vec3::from_array(config.target);
        let offset = Vec3::from_array(config.position) - target;
        let distance = offset
            .length()
            .clamp(config.min_distance, config.max_distance);
        let elevation = (offset.y / offset.length().max(f32::EPSILON)).clamp(-1.0, 1.0).asin();
        let azimuth = offset.z.atan2(offset.x);

        Self {
            distance,
            target_distance: distance,
            azimuth,
            elevation,
            target,
            fov_degrees: config.fov_degrees,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            smooth_factor: 0.15,
        }
    }

    /// Rotate around the pivot by a pointer delta in pixels
    pub fn orbit(&mut self, delta: Vec2) {
        self.azimuth += delta.x * self.sensitivity;
        self.elevation = (self.elevation + delta.y * self.sensitivity).clamp(-1.5, 1.5);
    }

    /// Scroll zoom, applied smoothly by `advance`
    pub fn zoom(&mut self, scroll: f32) {
        let zoom_factor = 1.0 - scroll * self.zoom_speed;
        self.target_distance =
            (self.target_distance * zoom_factor).clamp(self.min_distance, self.max_distance);
    }

    /// Ease the distance toward its target
    pub fn advance(&mut self, dt: f32) {
        let lerp_factor = 1.0 - (-self.smooth_factor * 60.0 * dt).exp();
        self.distance += (self.target_distance - self.distance) * lerp_factor;
    }

    /// Camera position on the orbit sphere
    pub fn eye(&self) -> Vec3 {
        let x = self.distance * self.azimuth.cos() * self.elevation.cos();
        let y = self.distance * self.elevation.sin();
        let z = self.distance * self.azimuth.sin() * self.elevation.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.target, Vec3::Y)
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_reproduce_configured_eye() {
        let settings = CameraSettings::from_config(&CameraConfig::default());
        assert!(settings.eye().abs_diff_eq(Vec3::new(4.0, 5.0, 7.0), 1e-4));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut settings = CameraSettings::default();
        for _ in 0..200 {
            settings.zoom(5.0);
        }
        assert_eq!(settings.target_distance, settings.min_distance);

        for _ in 0..200 {
            settings.zoom(-5.0);
        }
        assert_eq!(settings.target_distance, settings.max_distance);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let rig = CameraRig::perspective(
            Vec3::new(3.5, 1.0, 10.0),
            Vec3::new(3.5, 1.0, 0.0),
            75f32.to_radians(),
            16.0 / 9.0,
            0.1,
        );
        let ray = rig.ray_from_ndc(Vec2::ZERO).unwrap();
        assert!(ray.direction.abs_diff_eq(Vec3::NEG_Z, 1e-4));
        assert!(ray.origin.abs_diff_eq(Vec3::new(3.5, 1.0, 9.9), 1e-3));
    }

    #[test]
    fn test_edge_ray_spans_half_fov() {
        let fov = 90f32.to_radians();
        let rig = CameraRig::perspective(Vec3::ZERO, Vec3::NEG_Z, fov, 1.0, 0.1);
        let ray = rig.ray_from_ndc(Vec2::new(0.0, 1.0)).unwrap();
        let expected = Vec3::new(0.0, 1.0, -1.0).normalize();
        assert!(ray.direction.abs_diff_eq(expected, 1e-3));
    }
}
