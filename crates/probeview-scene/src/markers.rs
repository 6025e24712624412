//! Sensor markers and the registry that holds them

use bevy::math::Affine3A;
use bevy::prelude::*;
use probeview_core::{SensorGeometry, SensorSpec};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Duplicate marker id: {0}")]
    DuplicateId(MarkerId),
}

/// Stable marker identity, taken from the sensor catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u32);

impl std::fmt::Display for MarkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Highlight state of a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerVisual {
    #[default]
    Normal,
    Hovered,
    Selected,
}

/// Pickable geometry, centered on the marker position in model space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickShape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
}

impl From<SensorGeometry> for PickShape {
    fn from(geometry: SensorGeometry) -> Self {
        match geometry {
            SensorGeometry::Sphere { radius } => PickShape::Sphere { radius },
            SensorGeometry::Box { half_extents } => PickShape::Box {
                half_extents: Vec3::from_array(half_extents),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub name: String,
    /// Position relative to the model root
    pub position: Vec3,
    pub shape: PickShape,
    pub visual: MarkerVisual,
}

impl Marker {
    pub fn new(id: u32, name: &str, position: Vec3, shape: PickShape) -> Self {
        Self {
            id: MarkerId(id),
            name: name.to_string(),
            position,
            shape,
            visual: MarkerVisual::Normal,
        }
    }
}

/// Markers attached to the loaded model, in display order.
///
/// Positions are stored in model space; `root` maps them into the world.
#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    markers: Vec<Marker>,
    root: Affine3A,
    root_inverse: Affine3A,
}

impl MarkerRegistry {
    pub fn new(root: Affine3A, markers: Vec<Marker>) -> Result<Self, RegistryError> {
        for (i, marker) in markers.iter().enumerate() {
            if markers[..i].iter().any(|m| m.id == marker.id) {
                return Err(RegistryError::DuplicateId(marker.id));
            }
        }

        Ok(Self {
            markers,
            root,
            root_inverse: root.inverse(),
        })
    }

    /// Build the registry from catalog entries once the model root is known
    pub fn from_specs(
        specs: &[SensorSpec],
        default_radius: f32,
        root: Affine3A,
    ) -> Result<Self, RegistryError> {
        let markers = specs
            .iter()
            .map(|spec| {
                Marker::new(
                    spec.id,
                    &spec.name,
                    Vec3::from_array(spec.position),
                    spec.geometry(default_radius).into(),
                )
            })
            .collect();
        Self::new(root, markers)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    fn get_mut(&mut self, id: MarkerId) -> Option<&mut Marker> {
        self.markers.iter_mut().find(|m| m.id == id)
    }

    /// Model root transform (model space to world)
    pub fn root(&self) -> Affine3A {
        self.root
    }

    /// Inverse of the model root transform (world to model space)
    pub fn root_inverse(&self) -> Affine3A {
        self.root_inverse
    }

    pub fn world_position(&self, id: MarkerId) -> Option<Vec3> {
        self.get(id).map(|m| self.root.transform_point3(m.position))
    }

    pub fn local_from_world(&self, world: Vec3) -> Vec3 {
        self.root_inverse.transform_point3(world)
    }

    /// Move a marker; returns false for an unknown id
    pub fn set_position(&mut self, id: MarkerId, position: Vec3) -> bool {
        match self.get_mut(id) {
            Some(marker) => {
                marker.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_visual(&mut self, id: MarkerId, visual: MarkerVisual) {
        if let Some(marker) = self.get_mut(id) {
            marker.visual = visual;
        }
    }

    pub fn visual(&self, id: MarkerId) -> Option<MarkerVisual> {
        self.get(id).map(|m| m.visual)
    }

    /// Number of markers currently carrying the given visual state
    pub fn count_visual(&self, visual: MarkerVisual) -> usize {
        self.markers.iter().filter(|m| m.visual == visual).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_ids_rejected() {
        let shape = PickShape::Sphere { radius: 0.1 };
        let result = MarkerRegistry::new(
            Affine3A::IDENTITY,
            vec![
                Marker::new(1, "A", Vec3::ZERO, shape),
                Marker::new(2, "B", Vec3::X, shape),
                Marker::new(1, "C", Vec3::Y, shape),
            ],
        );
        assert_eq!(result.unwrap_err(), RegistryError::DuplicateId(MarkerId(1)));
    }

    #[test]
    fn test_world_and_local_positions() {
        let root = Affine3A::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::IDENTITY,
            Vec3::new(0.0, 1.0, 0.0),
        );
        let specs = vec![SensorSpec::new(1, "Oxygen sensor", [3.5, 1.0, 0.0])];
        let registry = MarkerRegistry::from_specs(&specs, 0.1, root).unwrap();

        let world = registry.world_position(MarkerId(1)).unwrap();
        assert!(world.abs_diff_eq(Vec3::new(7.0, 3.0, 0.0), 1e-5));
        assert!(registry.local_from_world(world).abs_diff_eq(Vec3::new(3.5, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_catalog_shapes() {
        let mut specs = vec![
            SensorSpec::new(1, "Sphere", [0.0, 0.0, 0.0]),
            SensorSpec::new(2, "Box", [1.0, 0.0, 0.0]),
        ];
        specs[1].half_extents = Some([0.1, 0.2, 0.3]);

        let registry = MarkerRegistry::from_specs(&specs, 0.25, Affine3A::IDENTITY).unwrap();
        assert_eq!(registry.get(MarkerId(1)).unwrap().shape, PickShape::Sphere { radius: 0.25 });
        assert_eq!(
            registry.get(MarkerId(2)).unwrap().shape,
            PickShape::Box { half_extents: Vec3::new(0.1, 0.2, 0.3) }
        );
        assert_eq!(registry.count_visual(MarkerVisual::Normal), 2);
    }
}
