//! 3D scene: camera, lights, ground grid, and the vehicle model

use bevy::asset::LoadState;
use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::math::Affine3A;
use bevy::prelude::*;
use probeview_core::config::ModelConfig;
use probeview_scene::{CameraSettings, MainCamera, ModelLoadError, Session, SessionEvent, ViewerSettings};

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_scene, spawn_model))
            .add_systems(Update, poll_model_load);
    }
}

/// Root entity of the loaded vehicle
#[derive(Component)]
pub struct VehicleModel;

/// Marker for grid lines
#[derive(Component)]
pub struct GridLine;

/// Model load in flight
#[derive(Resource)]
pub struct PendingModel {
    pub path: String,
    pub handle: Handle<Scene>,
    pub root: Affine3A,
}

const GRID_HALF_CELLS: i32 = 10;
const GRID_SPACING: f32 = 1.0;

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<CameraSettings>,
) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: settings.fov_degrees.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        settings.transform(),
        MainCamera,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.9, 0.95, 1.0),
        brightness: 400.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 5000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(5.0, 10.0, 7.5).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Ground grid on the XZ plane
    let extent = GRID_HALF_CELLS as f32 * GRID_SPACING * 2.0;
    let line_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.35, 0.35, 0.4),
        unlit: true,
        ..default()
    });
    let along_x = meshes.add(Cuboid::new(extent, 0.002, 0.01));
    let along_z = meshes.add(Cuboid::new(0.01, 0.002, extent));

    for i in -GRID_HALF_CELLS..=GRID_HALF_CELLS {
        let offset = i as f32 * GRID_SPACING;
        commands.spawn((
            Mesh3d(along_x.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_xyz(0.0, 0.0, offset),
            GridLine,
        ));
        commands.spawn((
            Mesh3d(along_z.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_xyz(offset, 0.0, 0.0),
            GridLine,
        ));
    }
}

/// Model root transform from its configured placement
pub fn model_root(config: &ModelConfig) -> Affine3A {
    Affine3A::from_scale_rotation_translation(
        Vec3::splat(config.scale),
        Quat::IDENTITY,
        Vec3::from_array(config.position),
    )
}

fn spawn_model(mut commands: Commands, asset_server: Res<AssetServer>, settings: Res<ViewerSettings>) {
    let model = &settings.0.model;
    let handle = asset_server.load(GltfAssetLabel::Scene(0).from_asset(model.path.clone()));
    let root = model_root(model);

    commands.spawn((
        SceneRoot(handle.clone()),
        Transform::from_matrix(Mat4::from(root)),
        VehicleModel,
    ));
    commands.insert_resource(PendingModel {
        path: model.path.clone(),
        handle,
        root,
    });
    tracing::info!(path = %model.path, "Loading vehicle model");
}

/// Forward the load result to the session once the asset server settles
fn poll_model_load(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    pending: Option<Res<PendingModel>>,
    mut events: MessageWriter<SessionEvent>,
) {
    let Some(pending) = pending else {
        return;
    };

    let result = match asset_server.load_state(&pending.handle) {
        LoadState::Loaded => Ok(pending.root),
        LoadState::Failed(err) => Err(ModelLoadError::Failed {
            path: pending.path.clone(),
            reason: err.to_string(),
        }),
        _ => return,
    };

    events.write(SessionEvent::ModelLoaded(result));
    commands.remove_resource::<PendingModel>();
}

/// Orbit and zoom; suspended while a marker is dragged or egui has the pointer
pub fn update_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut settings: ResMut<CameraSettings>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    session: Res<Session>,
    gizmo: Res<probeview_scene::TranslateGizmo>,
    time: Res<Time>,
    mut contexts: bevy_egui::EguiContexts,
) {
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);
    let orbit_enabled = session.orbit_enabled() && !gizmo.is_dragging() && !egui_wants_pointer;

    let total_motion: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    if orbit_enabled && mouse_button.pressed(MouseButton::Left) {
        settings.orbit(-total_motion);
    }

    // Drain scroll either way so it does not pile up
    let scroll: f32 = mouse_wheel.read().map(|w| w.y).sum();
    if orbit_enabled && scroll != 0.0 {
        settings.zoom(scroll * 0.3);
    }

    settings.advance(time.delta_secs());

    if let Ok(mut transform) = camera_query.single_mut() {
        *transform = settings.transform();
    }
}
