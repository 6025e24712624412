//! Marker entities mirrored from the session's registry

use bevy::math::Affine3A;
use bevy::prelude::*;
use probeview_core::config::{parse_hex_color, MarkerStyleConfig};
use probeview_scene::{MarkerId, MarkerVisual, PickShape, Session, ViewerSettings};

pub struct MarkerPlugin;

impl Plugin for MarkerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_marker_materials)
            .add_systems(PostUpdate, (spawn_marker_entities, sync_marker_entities).chain());
    }
}

/// Rendered marker, keyed to the registry
#[derive(Component)]
pub struct MarkerEntity {
    pub id: MarkerId,
}

/// One shared material per highlight state
#[derive(Resource)]
pub struct MarkerMaterials {
    pub normal: Handle<StandardMaterial>,
    pub hovered: Handle<StandardMaterial>,
    pub selected: Handle<StandardMaterial>,
}

impl MarkerMaterials {
    pub fn for_visual(&self, visual: MarkerVisual) -> &Handle<StandardMaterial> {
        match visual {
            MarkerVisual::Normal => &self.normal,
            MarkerVisual::Hovered => &self.hovered,
            MarkerVisual::Selected => &self.selected,
        }
    }
}

fn marker_color(text: &str, fallback: Color) -> Color {
    match parse_hex_color(text) {
        Ok([r, g, b]) => Color::srgb(r, g, b),
        Err(e) => {
            tracing::warn!(error = %e, "Using fallback marker color");
            fallback
        }
    }
}

fn marker_material(color: Color) -> StandardMaterial {
    StandardMaterial {
        base_color: color,
        emissive: color.to_linear() * 0.4,
        ..default()
    }
}

fn setup_marker_materials(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<ViewerSettings>,
) {
    let style: &MarkerStyleConfig = &settings.0.markers;
    commands.insert_resource(MarkerMaterials {
        normal: materials.add(marker_material(marker_color(&style.normal_color, Color::srgb(0.0, 0.67, 1.0)))),
        hovered: materials.add(marker_material(marker_color(&style.hovered_color, Color::srgb(0.4, 0.8, 1.0)))),
        selected: materials.add(marker_material(marker_color(&style.selected_color, Color::srgb(1.0, 0.67, 0.0)))),
    });
}

fn shape_mesh(shape: PickShape) -> Mesh {
    match shape {
        PickShape::Sphere { radius } => Sphere::new(radius).mesh().uv(24, 16),
        PickShape::Box { half_extents } => Cuboid::from_size(half_extents * 2.0).into(),
    }
}

/// Entity transform for a model-space marker under the model root, so the
/// drawn size scales the same way the pick shape does
fn marker_transform(root: Affine3A, position: Vec3) -> Transform {
    Transform::from_matrix(Mat4::from(root * Affine3A::from_translation(position)))
}

/// Spawn one entity per registered marker once the registry exists
fn spawn_marker_entities(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    session: Res<Session>,
    materials: Option<Res<MarkerMaterials>>,
    existing: Query<(), With<MarkerEntity>>,
) {
    let Some(materials) = materials else {
        return;
    };
    let registry = session.registry();
    if registry.is_empty() || !existing.is_empty() {
        return;
    }

    let root = registry.root();
    for marker in registry.iter() {
        commands.spawn((
            Mesh3d(meshes.add(shape_mesh(marker.shape))),
            MeshMaterial3d(materials.for_visual(marker.visual).clone()),
            marker_transform(root, marker.position),
            MarkerEntity { id: marker.id },
            Name::new(marker.name.clone()),
        ));
    }
    tracing::info!(count = registry.len(), "Spawned marker entities");
}

/// Follow registry positions and highlight states
fn sync_marker_entities(
    session: Res<Session>,
    materials: Option<Res<MarkerMaterials>>,
    mut query: Query<(&MarkerEntity, &mut Transform, &mut MeshMaterial3d<StandardMaterial>)>,
) {
    let Some(materials) = materials else {
        return;
    };
    if !session.is_changed() {
        return;
    }
    let registry = session.registry();
    let root = registry.root();

    for (entity, mut transform, mut material) in query.iter_mut() {
        let Some(marker) = registry.get(entity.id) else {
            continue;
        };
        let wanted_transform = marker_transform(root, marker.position);
        if *transform != wanted_transform {
            *transform = wanted_transform;
        }
        let wanted = materials.for_visual(marker.visual);
        if material.0 != *wanted {
            material.0 = wanted.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::model_root;
    use probeview_core::config::ModelConfig;

    #[test]
    fn test_marker_transform_follows_model_scale() {
        let config = ModelConfig {
            scale: 2.0,
            position: [0.0, 0.0, 0.0],
            ..Default::default()
        };
        let transform = marker_transform(model_root(&config), Vec3::new(3.5, 1.0, 0.0));

        assert!(transform.translation.abs_diff_eq(Vec3::new(7.0, 2.0, 0.0), 1e-5));
        assert!(transform.scale.abs_diff_eq(Vec3::splat(2.0), 1e-5));
    }

    #[test]
    fn test_marker_transform_with_offset_root() {
        let config = ModelConfig {
            scale: 0.5,
            position: [1.0, -2.0, 3.0],
            ..Default::default()
        };
        let transform = marker_transform(model_root(&config), Vec3::new(2.0, 4.0, -2.0));

        assert!(transform.translation.abs_diff_eq(Vec3::new(2.0, 0.0, 2.0), 1e-5));
        assert!(transform.scale.abs_diff_eq(Vec3::splat(0.5), 1e-5));
        assert!(transform.rotation.abs_diff_eq(Quat::IDENTITY, 1e-5));
    }
}
