//! Bevy application setup

use bevy::prelude::*;
use bevy::winit::WinitSettings;
use bevy_egui::EguiPlugin;
use bevy_picking::DefaultPickingPlugins;
use probeview_core::ViewerConfig;
use probeview_scene::ProbeScenePlugin;

use crate::input::InputPlugin;
use crate::markers::MarkerPlugin;
use crate::overlay::OverlayPlugin;
use crate::scene::ScenePlugin;

pub fn run(config: ViewerConfig) {
    tracing::info!(
        sensors = config.sensors.len(),
        model = %config.model.path,
        "Starting Probeview"
    );

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.1, 0.1, 0.15)))
        .insert_resource(WinitSettings::default())
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Probeview".to_string(),
                    canvas: Some("#probeview-canvas".to_string()),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: false,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                file_path: "assets".to_string(),
                // Static hosting serves no .meta files
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            })
        )
        // Must come before EguiPlugin so egui can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(EguiPlugin::default())
        .add_plugins(ProbeScenePlugin { config })
        .add_plugins(ScenePlugin)
        .add_plugins(MarkerPlugin)
        .add_plugins(InputPlugin)
        .add_plugins(OverlayPlugin)
        .run();
}
