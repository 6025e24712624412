//! Gizmo handles and egui overlays

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass};
use probeview_core::Axis;
use probeview_scene::ui::{render_coordinate_panel, render_status, render_tooltip};
use probeview_scene::{Manipulator, Session, SessionEvent, TranslateGizmo};

pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, draw_translate_gizmo)
            // egui systems run in EguiPrimaryContextPass (bevy_egui 0.38+)
            .add_systems(EguiPrimaryContextPass, ui_system);
    }
}

fn axis_color(axis: Axis) -> Color {
    match axis {
        Axis::X => Color::srgb(0.9, 0.2, 0.2),
        Axis::Y => Color::srgb(0.2, 0.9, 0.2),
        Axis::Z => Color::srgb(0.2, 0.4, 0.95),
    }
}

fn draw_translate_gizmo(mut gizmos: Gizmos, gizmo: Res<TranslateGizmo>) {
    if gizmo.target().is_none() {
        return;
    }
    let highlighted = gizmo.active_axis().or(gizmo.hovered_axis());

    for (axis, start, end) in gizmo.handles() {
        let color = if highlighted == Some(axis) {
            Color::srgb(1.0, 0.9, 0.2)
        } else {
            axis_color(axis)
        };
        gizmos.arrow(start, end, color);
    }
}

fn ui_system(mut contexts: EguiContexts, session: Res<Session>, mut writer: MessageWriter<SessionEvent>) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    let mut events = Vec::new();
    render_status(ctx, session.model_state());
    render_coordinate_panel(ctx, &session, &mut events);
    render_tooltip(ctx, session.tooltip());

    writer.write_batch(events);
}
