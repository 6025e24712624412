//! Window input to session events, and the dispatch into the session
//!
//! Each frame runs in a fixed order: pointer and gizmo input are turned into
//! messages, a tick is queued, and then every pending message is handed to
//! the session in arrival order. The camera follows afterwards so it sees
//! the updated drag state.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::{egui, EguiContexts};
use probeview_scene::{
    CameraRig, Clipboard, ClipboardError, Host, MainCamera, PickCamera, Session, SessionEvent,
    TranslateGizmo, Viewport,
};

use crate::scene::update_camera;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (pointer_input, queue_tick, dispatch_session_events, update_camera).chain(),
        )
        .add_systems(Last, shutdown_on_exit);
    }
}

/// Pick rays from a Bevy camera
pub fn camera_rig(camera: &Camera, transform: &GlobalTransform) -> CameraRig {
    CameraRig::new(Mat4::from(transform.affine()), camera.clip_from_view())
}

/// Used when no camera exists yet; every pick misses
struct NoCamera;

impl PickCamera for NoCamera {
    fn ray_from_ndc(&self, _ndc: Vec2) -> Option<Ray3d> {
        None
    }
}

/// System clipboard through egui
struct EguiClipboard {
    ctx: Option<egui::Context>,
}

impl Clipboard for EguiClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let ctx = self
            .ctx
            .as_ref()
            .ok_or_else(|| ClipboardError::Unavailable("no egui context".to_string()))?;
        ctx.copy_text(text.to_string());
        Ok(())
    }
}

fn viewport_for(camera: &Camera, window: &Window) -> Viewport {
    match camera.logical_viewport_rect() {
        Some(rect) => Viewport::new(rect.min, rect.size()),
        None => Viewport::from_size(window.width(), window.height()),
    }
}

/// Cursor and left button to pointer and gizmo events
fn pointer_input(
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut gizmo: ResMut<TranslateGizmo>,
    mut contexts: EguiContexts,
    mut events: MessageWriter<SessionEvent>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);

    if mouse_button.just_released(MouseButton::Left) {
        if let Some(event) = gizmo.release() {
            events.write(SessionEvent::Gizmo(event));
        }
    }

    let Some(screen) = window.cursor_position() else {
        events.write(SessionEvent::PointerLeft);
        gizmo.hover(None);
        return;
    };

    let viewport = viewport_for(camera, window);
    events.write(SessionEvent::PointerMoved { screen, viewport });

    let rig = camera_rig(camera, camera_transform);
    let ray = viewport.to_ndc(screen).and_then(|ndc| rig.ray_from_ndc(ndc));

    if gizmo.is_dragging() {
        if mouse_button.pressed(MouseButton::Left) {
            if let Some(event) = ray.and_then(|r| gizmo.drag_to(r)) {
                events.write(SessionEvent::Gizmo(event));
            }
        }
        return;
    }

    if egui_wants_pointer {
        gizmo.hover(None);
        return;
    }

    if mouse_button.just_pressed(MouseButton::Left) {
        // A press on a gizmo handle starts a drag instead of a pick
        match ray.and_then(|r| gizmo.press(r)) {
            Some(event) => {
                events.write(SessionEvent::Gizmo(event));
            }
            None => {
                events.write(SessionEvent::PointerDown);
            }
        }
    }

    gizmo.hover(ray);
}

fn queue_tick(mut events: MessageWriter<SessionEvent>) {
    events.write(SessionEvent::Tick);
}

/// Hand every pending message to the session, in order
fn dispatch_session_events(
    mut reader: MessageReader<SessionEvent>,
    mut session: ResMut<Session>,
    mut gizmo: ResMut<TranslateGizmo>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut contexts: EguiContexts,
) {
    let rig = camera_query
        .single()
        .ok()
        .map(|(camera, transform)| camera_rig(camera, transform));
    let camera: &dyn PickCamera = match &rig {
        Some(rig) => rig,
        None => &NoCamera,
    };
    let mut clipboard = EguiClipboard {
        ctx: contexts.ctx_mut().ok().map(|ctx| ctx.clone()),
    };

    let mut host = Host {
        camera,
        gizmo: &mut *gizmo,
        clipboard: &mut clipboard,
    };
    for event in reader.read() {
        session.handle(event.clone(), &mut host);
    }
}

fn shutdown_on_exit(
    mut exit: MessageReader<AppExit>,
    mut session: ResMut<Session>,
    mut gizmo: ResMut<TranslateGizmo>,
) {
    if exit.read().next().is_some() {
        session.shutdown(&mut *gizmo);
    }
}
