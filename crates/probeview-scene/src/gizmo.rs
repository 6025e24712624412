//! Manipulation gizmo: the widget seam, the adapter, and a translate gizmo

use bevy::prelude::*;
use probeview_core::Axis;
use probeview_core::config::GizmoConfig;
use tracing::debug;

use crate::markers::MarkerId;

/// Events a manipulation widget reports back
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GizmoEvent {
    /// A drag started (`true`) or ended (`false`)
    DragChanged(bool),
    /// The attached object was moved to a new world position
    ObjectChanged(Vec3),
}

/// An on-screen widget that can be bound to one marker at a time
pub trait Manipulator: Send + Sync {
    fn attach(&mut self, target: MarkerId, position: Vec3);
    fn detach(&mut self);
    fn target(&self) -> Option<MarkerId>;
    /// Follow a target that was moved by something other than the widget
    fn sync_position(&mut self, position: Vec3);
}

/// Keeps the widget bound to the selected marker
#[derive(Debug, Default)]
pub struct GizmoAdapter {
    attached: Option<MarkerId>,
}

impl GizmoAdapter {
    pub fn attach(&mut self, gizmo: &mut dyn Manipulator, marker: MarkerId, world_position: Vec3) {
        if self.attached != Some(marker) || gizmo.target() != Some(marker) {
            debug!(%marker, "Gizmo attached");
        }
        gizmo.attach(marker, world_position);
        self.attached = Some(marker);
    }

    /// Unbind the widget; the marker keeps its last position
    pub fn detach(&mut self, gizmo: &mut dyn Manipulator) {
        if let Some(marker) = self.attached.take() {
            debug!(%marker, "Gizmo detached");
        }
        gizmo.detach();
    }

    pub fn sync(&self, gizmo: &mut dyn Manipulator, marker: MarkerId, world_position: Vec3) {
        if self.attached == Some(marker) {
            gizmo.sync_position(world_position);
        }
    }

    pub fn attached(&self) -> Option<MarkerId> {
        self.attached
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisDrag {
    axis: Axis,
    start_position: Vec3,
    /// Axis parameter under the pointer when the drag began
    grab: f32,
}

/// Three-handle translate gizmo
#[derive(Debug, Clone, Resource)]
pub struct TranslateGizmo {
    size: f32,
    pick_radius: f32,
    target: Option<MarkerId>,
    position: Vec3,
    hovered_axis: Option<Axis>,
    drag: Option<AxisDrag>,
}

impl Default for TranslateGizmo {
    fn default() -> Self {
        Self::from_config(&GizmoConfig::default())
    }
}

impl TranslateGizmo {
    pub fn from_config(config: &GizmoConfig) -> Self {
        Self {
            size: config.size,
            pick_radius: config.pick_radius,
            target: None,
            position: Vec3::ZERO,
            hovered_axis: None,
            drag: None,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn hovered_axis(&self) -> Option<Axis> {
        self.hovered_axis
    }

    pub fn active_axis(&self) -> Option<Axis> {
        self.drag.map(|d| d.axis)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Handle segments as (axis, start, end) in world space
    pub fn handles(&self) -> [(Axis, Vec3, Vec3); 3] {
        Axis::ALL.map(|axis| (axis, self.position, self.position + axis_vector(axis) * self.size))
    }

    /// Closest handle within the pick radius of the ray
    pub fn handle_under(&self, ray: Ray3d) -> Option<Axis> {
        self.target?;
        self.handles()
            .into_iter()
            .filter_map(|(axis, start, end)| {
                let distance = ray_segment_distance(ray, start, end)?;
                (distance <= self.pick_radius).then_some((axis, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(axis, _)| axis)
    }

    /// Track the handle under the pointer for highlighting
    pub fn hover(&mut self, ray: Option<Ray3d>) {
        if self.drag.is_none() {
            self.hovered_axis = ray.and_then(|r| self.handle_under(r));
        }
    }

    /// Pointer pressed: grab a handle if one is under the ray
    pub fn press(&mut self, ray: Ray3d) -> Option<GizmoEvent> {
        if self.drag.is_some() {
            return None;
        }
        let axis = self.handle_under(ray)?;
        let grab = axis_parameter(ray, self.position, axis_vector(axis))?;
        self.drag = Some(AxisDrag {
            axis,
            start_position: self.position,
            grab,
        });
        self.hovered_axis = Some(axis);
        Some(GizmoEvent::DragChanged(true))
    }

    /// Pointer moved while pressed: slide along the grabbed axis
    pub fn drag_to(&mut self, ray: Ray3d) -> Option<GizmoEvent> {
        let drag = self.drag?;
        let direction = axis_vector(drag.axis);
        let current = axis_parameter(ray, drag.start_position, direction)?;
        let position = drag.start_position + direction * (current - drag.grab);
        if position == self.position {
            return None;
        }
        self.position = position;
        Some(GizmoEvent::ObjectChanged(position))
    }

    /// Pointer released: end any drag
    pub fn release(&mut self) -> Option<GizmoEvent> {
        self.drag.take().map(|_| GizmoEvent::DragChanged(false))
    }
}

impl Manipulator for TranslateGizmo {
    fn attach(&mut self, target: MarkerId, position: Vec3) {
        if self.target != Some(target) {
            self.drag = None;
        }
        self.target = Some(target);
        self.position = position;
    }

    fn detach(&mut self) {
        self.target = None;
        self.drag = None;
        self.hovered_axis = None;
    }

    fn target(&self) -> Option<MarkerId> {
        self.target
    }

    fn sync_position(&mut self, position: Vec3) {
        if self.drag.is_none() {
            self.position = position;
        }
    }
}

pub fn axis_vector(axis: Axis) -> Vec3 {
    match axis {
        Axis::X => Vec3::X,
        Axis::Y => Vec3::Y,
        Axis::Z => Vec3::Z,
    }
}

/// Parameter along the line `origin + s * direction` of the point closest to
/// the ray. `None` when the ray runs parallel to the line.
fn axis_parameter(ray: Ray3d, origin: Vec3, direction: Vec3) -> Option<f32> {
    let ray_dir = *ray.direction;
    let w0 = origin - ray.origin;
    let b = direction.dot(ray_dir);
    let denom = 1.0 - b * b;
    if denom < 1e-6 {
        return None;
    }
    let d = direction.dot(w0);
    let e = ray_dir.dot(w0);
    Some((b * e - d) / denom)
}

/// Distance between a ray and a segment, measured from the closest point on
/// the segment to the forward half of the ray
fn ray_segment_distance(ray: Ray3d, start: Vec3, end: Vec3) -> Option<f32> {
    let segment = end - start;
    let length = segment.length();
    if length <= f32::EPSILON {
        return None;
    }
    let direction = segment / length;
    let s = axis_parameter(ray, start, direction)
        .unwrap_or(0.0)
        .clamp(0.0, length);
    let point = start + direction * s;

    let t = (point - ray.origin).dot(*ray.direction);
    if t < 0.0 {
        return None;
    }
    Some((ray.origin + *ray.direction * t).distance(point))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gizmo_at(position: Vec3) -> TranslateGizmo {
        let mut gizmo = TranslateGizmo::default();
        gizmo.attach(MarkerId(1), position);
        gizmo
    }

    fn down_ray(x: f32, z: f32) -> Ray3d {
        Ray3d::new(Vec3::new(x, 10.0, z), Dir3::NEG_Y)
    }

    #[test]
    fn test_handle_under_ray() {
        let gizmo = gizmo_at(Vec3::ZERO);
        assert_eq!(gizmo.handle_under(down_ray(0.4, 0.0)), Some(Axis::X));
        assert_eq!(gizmo.handle_under(down_ray(0.0, 0.4)), Some(Axis::Z));
        assert_eq!(gizmo.handle_under(down_ray(0.4, 0.4)), None);
        assert_eq!(gizmo.handle_under(down_ray(2.0, 0.0)), None);
    }

    #[test]
    fn test_detached_gizmo_has_no_handles() {
        let mut gizmo = gizmo_at(Vec3::ZERO);
        gizmo.detach();
        assert_eq!(gizmo.handle_under(down_ray(0.4, 0.0)), None);
        assert_eq!(gizmo.press(down_ray(0.4, 0.0)), None);
    }

    #[test]
    fn test_drag_along_axis() {
        let mut gizmo = gizmo_at(Vec3::new(1.0, 0.0, 0.0));

        assert_eq!(gizmo.press(down_ray(1.3, 0.0)), Some(GizmoEvent::DragChanged(true)));
        assert_eq!(gizmo.active_axis(), Some(Axis::X));

        // Off-axis pointer motion only moves along X
        let event = gizmo.drag_to(down_ray(1.8, 0.7)).unwrap();
        match event {
            GizmoEvent::ObjectChanged(position) => {
                assert!(position.abs_diff_eq(Vec3::new(1.5, 0.0, 0.0), 1e-4));
            }
            other => panic!("unexpected event {:?}", other),
        }

        // Sync from the panel is ignored mid-drag
        gizmo.sync_position(Vec3::splat(9.0));
        assert!(gizmo.position().abs_diff_eq(Vec3::new(1.5, 0.0, 0.0), 1e-4));

        assert_eq!(gizmo.release(), Some(GizmoEvent::DragChanged(false)));
        assert_eq!(gizmo.release(), None);
        assert!(!gizmo.is_dragging());
    }

    #[test]
    fn test_parallel_ray_does_not_move() {
        let mut gizmo = gizmo_at(Vec3::ZERO);
        gizmo.press(down_ray(0.3, 0.0)).unwrap();
        let parallel = Ray3d::new(Vec3::new(-5.0, 0.0, 0.0), Dir3::X);
        assert_eq!(gizmo.drag_to(parallel), None);
    }

    #[test]
    fn test_adapter_tracks_binding() {
        let mut gizmo = TranslateGizmo::default();
        let mut adapter = GizmoAdapter::default();

        adapter.attach(&mut gizmo, MarkerId(3), Vec3::ONE);
        assert_eq!(adapter.attached(), Some(MarkerId(3)));
        assert_eq!(gizmo.target(), Some(MarkerId(3)));

        adapter.sync(&mut gizmo, MarkerId(4), Vec3::ZERO);
        assert_eq!(gizmo.position(), Vec3::ONE);
        adapter.sync(&mut gizmo, MarkerId(3), Vec3::X);
        assert_eq!(gizmo.position(), Vec3::X);

        adapter.detach(&mut gizmo);
        assert_eq!(adapter.attached(), None);
        assert_eq!(gizmo.target(), None);
    }
}
