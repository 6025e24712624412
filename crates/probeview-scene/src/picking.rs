//! Ray picking against sensor markers

use bevy::prelude::*;

use crate::camera::PickCamera;
use crate::markers::{MarkerId, MarkerRegistry, PickShape};

/// A marker intersected by a pick ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub marker: MarkerId,
    /// Distance from the ray origin along the world ray
    pub distance: f32,
}

/// Ray caster with a reusable hit buffer, cheap enough to run every frame
#[derive(Debug, Default)]
pub struct Picker {
    hits: Vec<RayHit>,
}

impl Picker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nearest marker under a normalized device coordinate
    pub fn pick(
        &mut self,
        ndc: Vec2,
        camera: &dyn PickCamera,
        registry: &MarkerRegistry,
    ) -> Option<MarkerId> {
        let ray = camera.ray_from_ndc(ndc)?;
        self.pick_ray(ray, registry).map(|hit| hit.marker)
    }

    /// Intersect a world ray with every marker, nearest hit first
    pub fn pick_ray(&mut self, ray: Ray3d, registry: &MarkerRegistry) -> Option<RayHit> {
        self.hits.clear();
        if registry.is_empty() {
            return None;
        }

        // Work in model space; the direction stays unnormalized so the ray
        // parameter is still the world distance.
        let inverse = registry.root_inverse();
        let origin = inverse.transform_point3(ray.origin);
        let direction = inverse.transform_vector3(*ray.direction);

        for marker in registry.iter() {
            let distance = match marker.shape {
                PickShape::Sphere { radius } => {
                    intersect_sphere(origin, direction, marker.position, radius)
                }
                PickShape::Box { half_extents } => {
                    intersect_box(origin, direction, marker.position, half_extents)
                }
            };
            if let Some(distance) = distance {
                self.hits.push(RayHit {
                    marker: marker.id,
                    distance,
                });
            }
        }

        self.hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        self.hits.first().copied()
    }

    /// Hits of the last pick, nearest first
    pub fn hits(&self) -> &[RayHit] {
        &self.hits
    }
}

/// Smallest positive ray parameter where the ray meets a sphere
fn intersect_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let a = direction.length_squared();
    if a <= f32::EPSILON {
        return None;
    }
    let half_b = oc.dot(direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let near = (-half_b - root) / a;
    let far = (-half_b + root) / a;
    if near > 0.0 {
        Some(near)
    } else if far > 0.0 {
        Some(far)
    } else {
        None
    }
}

/// Slab test against an axis-aligned box
fn intersect_box(origin: Vec3, direction: Vec3, center: Vec3, half_extents: Vec3) -> Option<f32> {
    let min = center - half_extents;
    let max = center + half_extents;
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let (o, d) = (origin[axis], direction[axis]);
        if d.abs() <= f32::EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let t1 = (min[axis] - o) / d;
        let t2 = (max[axis] - o) / d;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
    }

    if t_max < t_min || t_max <= 0.0 {
        return None;
    }
    if t_min > 0.0 { Some(t_min) } else { Some(t_max) }
}
