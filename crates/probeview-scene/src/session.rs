//! Interaction session: the single owner of selection, pointer, panel and tooltip
//!
//! Every input reaches the session as a [`SessionEvent`] through
//! [`Session::handle`], one at a time and in arrival order. External
//! collaborators (camera, gizmo widget, clipboard) are lent for the duration
//! of each call through [`Host`].

use bevy::math::Affine3A;
use bevy::prelude::*;
use probeview_core::{Axis, SensorSpec, ViewerConfig};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::camera::PickCamera;
use crate::gizmo::{GizmoAdapter, GizmoEvent, Manipulator};
use crate::markers::{Marker, MarkerId, MarkerRegistry};
use crate::panel::{Clipboard, PanelBinding};
use crate::picking::Picker;
use crate::pointer::{PointerState, Viewport};
use crate::selection::{InteractionState, SelectionMachine, Transition};
use crate::tooltip::Tooltip;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelLoadError {
    #[error("Failed to load model '{path}': {reason}")]
    Failed { path: String, reason: String },
}

/// Input to the session
#[derive(Message, Debug, Clone)]
pub enum SessionEvent {
    /// The asynchronous model load resolved; `Ok` carries the model root transform
    ModelLoaded(Result<Affine3A, ModelLoadError>),
    PointerMoved { screen: Vec2, viewport: Viewport },
    PointerLeft,
    PointerDown,
    /// One render frame
    Tick,
    Gizmo(GizmoEvent),
    /// A coordinate typed into the panel, in model space
    PanelEdited { axis: Axis, value: f32 },
    ExportRequested,
}

/// Collaborators lent to the session for one event
pub struct Host<'a> {
    pub camera: &'a dyn PickCamera,
    pub gizmo: &'a mut dyn Manipulator,
    pub clipboard: &'a mut dyn Clipboard,
}

/// Progress of the model load
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModelState {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

#[derive(Resource)]
pub struct Session {
    catalog: Vec<SensorSpec>,
    default_radius: f32,
    model: ModelState,
    registry: MarkerRegistry,
    selection: SelectionMachine,
    pointer: PointerState,
    picker: Picker,
    gizmo: GizmoAdapter,
    panel: PanelBinding,
    tooltip: Tooltip,
    active: bool,
}

impl Session {
    pub fn new(catalog: Vec<SensorSpec>, default_radius: f32) -> Self {
        Self {
            catalog,
            default_radius,
            model: ModelState::Loading,
            registry: MarkerRegistry::default(),
            selection: SelectionMachine::new(),
            pointer: PointerState::default(),
            picker: Picker::new(),
            gizmo: GizmoAdapter::default(),
            panel: PanelBinding::default(),
            tooltip: Tooltip::default(),
            active: true,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(config.sensors.clone(), config.markers.radius)
    }

    pub fn state(&self) -> InteractionState {
        self.selection.state()
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    pub fn model_state(&self) -> &ModelState {
        &self.model
    }

    pub fn panel(&self) -> &PanelBinding {
        &self.panel
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn selected_marker(&self) -> Option<&Marker> {
        self.selection
            .state()
            .selected()
            .and_then(|id| self.registry.get(id))
    }

    /// Camera orbit input is suppressed while a marker is being dragged
    pub fn orbit_enabled(&self) -> bool {
        self.selection.state().orbit_enabled()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn handle(&mut self, event: SessionEvent, host: &mut Host<'_>) {
        if !self.active {
            debug!(?event, "Session shut down, event ignored");
            return;
        }

        match event {
            SessionEvent::ModelLoaded(result) => self.on_model_loaded(result),
            SessionEvent::PointerMoved { screen, viewport } => self.pointer.update(&viewport, screen),
            SessionEvent::PointerLeft => self.pointer.clear(),
            SessionEvent::PointerDown => self.on_pointer_down(host),
            SessionEvent::Tick => self.on_tick(host),
            SessionEvent::Gizmo(GizmoEvent::DragChanged(dragging)) => self.on_drag_changed(dragging),
            SessionEvent::Gizmo(GizmoEvent::ObjectChanged(world)) => self.on_object_changed(world),
            SessionEvent::PanelEdited { axis, value } => self.on_panel_edited(axis, value, host),
            SessionEvent::ExportRequested => {
                self.export_coordinates(&mut *host.clipboard);
            }
        }
    }

    /// Copy the selected marker's coordinates; `None` without a selection
    pub fn export_coordinates(&mut self, clipboard: &mut dyn Clipboard) -> Option<String> {
        let marker = self.selection.state().selected().and_then(|id| self.registry.get(id));
        self.panel.export_coordinates(marker, clipboard)
    }

    /// Tear everything down at once: release the gizmo, hide the panel and
    /// tooltip, and ignore any later event
    pub fn shutdown(&mut self, gizmo: &mut dyn Manipulator) {
        if !self.active {
            return;
        }
        self.selection.reset(&mut self.registry);
        self.gizmo.detach(gizmo);
        self.panel.hide();
        self.tooltip.hide();
        self.pointer.clear();
        self.active = false;
        info!("Session shut down");
    }

    fn on_model_loaded(&mut self, result: Result<Affine3A, ModelLoadError>) {
        if self.model == ModelState::Ready {
            warn!("Model already loaded, ignoring repeated load result");
            return;
        }

        match result {
            Ok(root) => match MarkerRegistry::from_specs(&self.catalog, self.default_radius, root) {
                Ok(registry) => {
                    info!(markers = registry.len(), "Model loaded, markers registered");
                    self.registry = registry;
                    self.model = ModelState::Ready;
                }
                Err(e) => {
                    error!(error = %e, "Could not build marker registry");
                    self.model = ModelState::Failed(e.to_string());
                }
            },
            Err(e) => {
                error!(error = %e, "Model load failed, continuing without markers");
                self.model = ModelState::Failed(e.to_string());
            }
        }
    }

    fn pick_under_pointer(&mut self, camera: &dyn PickCamera) -> Option<MarkerId> {
        let ndc = self.pointer.ndc()?;
        self.picker.pick(ndc, camera, &self.registry)
    }

    fn on_tick(&mut self, host: &mut Host<'_>) {
        if !self.selection.state().allows_hover() {
            self.tooltip.hide();
            return;
        }

        let hit = self.pick_under_pointer(host.camera);
        if let Transition::HoverChanged { from, to } = self.selection.hover(hit, &mut self.registry) {
            debug!(?from, ?to, "Hover changed");
        }
        self.tooltip
            .present(hit.and_then(|id| self.registry.get(id)), &self.pointer);
    }

    fn on_pointer_down(&mut self, host: &mut Host<'_>) {
        let hit = self.pick_under_pointer(host.camera);

        match self.selection.pointer_down(hit, &mut self.registry) {
            Transition::Selected { previous, marker } => {
                if let Some(world) = self.registry.world_position(marker) {
                    self.gizmo.attach(&mut *host.gizmo, marker, world);
                }
                self.panel.refresh(self.registry.get(marker));
                if previous != Some(marker) {
                    self.panel.last_export = None;
                }
                self.panel.show();
                self.tooltip.hide();
                info!(%marker, name = %self.panel.name, coordinates = %self.panel.summary(), "Marker selected");
            }
            Transition::Cleared { previous } => {
                self.gizmo.detach(&mut *host.gizmo);
                self.panel.hide();
                if let Some(marker) = previous {
                    info!(%marker, "Marker deselected");
                }
            }
            _ => {
                if self.selection.state().is_dragging() {
                    debug!("Pointer-down during drag ignored");
                }
            }
        }
    }

    fn on_drag_changed(&mut self, dragging: bool) {
        if self.gizmo.attached().is_none() {
            warn!(dragging, "Drag event without an attached gizmo ignored");
            return;
        }
        match self.selection.drag_changed(dragging) {
            Transition::DragStarted(marker) => debug!(%marker, "Drag started, orbit disabled"),
            Transition::DragEnded(marker) => {
                debug!(%marker, coordinates = %self.panel.summary(), "Drag ended, orbit enabled")
            }
            _ => debug!(dragging, state = ?self.selection.state(), "Drag event ignored in current state"),
        }
    }

    fn on_object_changed(&mut self, world: Vec3) {
        let Some(marker) = self.selection.state().selected() else {
            return;
        };
        if self.gizmo.attached() != Some(marker) {
            return;
        }
        let local = self.registry.local_from_world(world);
        if self.registry.set_position(marker, local) {
            self.panel.refresh(self.registry.get(marker));
        }
    }

    fn on_panel_edited(&mut self, axis: Axis, value: f32, host: &mut Host<'_>) {
        let Some(marker) = self.selection_for_edit() else {
            return;
        };
        let Some(mut position) = self.registry.get(marker).map(|m| m.position) else {
            return;
        };
        position[axis.index()] = value;
        self.registry.set_position(marker, position);

        if let Some(world) = self.registry.world_position(marker) {
            self.gizmo.sync(&mut *host.gizmo, marker, world);
        }
        self.panel.refresh(self.registry.get(marker));
        debug!(%marker, axis = axis.label(), value, "Coordinate edited from panel");
    }

    /// Panel edits apply to a selected marker that is not being dragged
    fn selection_for_edit(&self) -> Option<MarkerId> {
        match self.selection.state() {
            InteractionState::Selected(marker) => Some(marker),
            _ => None,
        }
    }
}
