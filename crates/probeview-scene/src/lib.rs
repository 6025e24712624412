//! Probeview Scene - marker interaction for the vehicle sensor viewer
//!
//! Everything that decides what the user sees lives here: the marker
//! registry, ray picking, the hover/select/drag state machine, the gizmo
//! seam, and the coordinate panel. The [`Session`] ties them together and
//! is driven one [`SessionEvent`] at a time, so the whole interaction can be
//! exercised without a window.

pub mod camera;
pub mod gizmo;
pub mod markers;
pub mod panel;
pub mod picking;
pub mod pointer;
pub mod selection;
pub mod session;
pub mod tooltip;
pub mod ui;

use bevy::prelude::*;
use probeview_core::ViewerConfig;

/// Plugin that installs the interaction session and its resources
pub struct ProbeScenePlugin {
    pub config: ViewerConfig,
}

impl Plugin for ProbeScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SessionEvent>()
            .insert_resource(ViewerSettings(self.config.clone()))
            .insert_resource(Session::from_config(&self.config))
            .insert_resource(CameraSettings::from_config(&self.config.camera))
            .insert_resource(TranslateGizmo::from_config(&self.config.gizmo));
    }
}

/// The loaded viewer configuration
#[derive(Resource, Debug, Clone)]
pub struct ViewerSettings(pub ViewerConfig);

// Re-export commonly used types
pub use camera::{CameraRig, CameraSettings, MainCamera, PickCamera};
pub use gizmo::{GizmoEvent, Manipulator, TranslateGizmo};
pub use markers::{Marker, MarkerId, MarkerRegistry, MarkerVisual, PickShape};
pub use panel::{Clipboard, ClipboardError, PanelBinding};
pub use pointer::Viewport;
pub use selection::InteractionState;
pub use session::{Host, ModelLoadError, ModelState, Session, SessionEvent};
