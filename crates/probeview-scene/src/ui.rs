//! egui overlays: coordinate panel, hover tooltip, load status

use bevy_egui::egui;
use probeview_core::coords::{format_fixed, DISPLAY_DECIMALS};
use probeview_core::{parse_coordinate, Axis};

use crate::session::{ModelState, Session, SessionEvent};
use crate::tooltip::Tooltip;

/// Render the selected marker's panel. Edits and the export button are
/// queued as session events rather than applied here.
pub fn render_coordinate_panel(ctx: &egui::Context, session: &Session, events: &mut Vec<SessionEvent>) {
    let panel = session.panel();
    if !panel.visible {
        return;
    }
    let Some(marker) = session.selected_marker() else {
        return;
    };
    let editable = !session.state().is_dragging();

    egui::Window::new("Sensor")
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            ui.heading(&panel.name);
            ui.label(
                egui::RichText::new(format!("ID {}", marker.id))
                    .small()
                    .color(egui::Color32::GRAY),
            );
            ui.separator();

            egui::Grid::new("sensor_coordinates")
                .num_columns(2)
                .spacing([8.0, 4.0])
                .show(ui, |ui| {
                    for axis in Axis::ALL {
                        ui.label(format!("{}:", axis.label()));
                        let mut value = marker.position[axis.index()];
                        let response = ui.add_enabled(
                            editable,
                            egui::DragValue::new(&mut value)
                                .speed(0.01)
                                .custom_formatter(|v, _| format_fixed(v as f32, DISPLAY_DECIMALS))
                                .custom_parser(|text| parse_coordinate(text).map(f64::from)),
                        );
                        if response.changed() && value.is_finite() {
                            events.push(SessionEvent::PanelEdited { axis, value });
                        }
                        ui.end_row();
                    }
                });

            ui.separator();
            if ui.button("Copy coordinates").clicked() {
                events.push(SessionEvent::ExportRequested);
            }
            if let Some(text) = &panel.last_export {
                ui.label(egui::RichText::new(text).monospace().small());
            }
        });
}

/// Render the hovered marker's name next to the pointer
pub fn render_tooltip(ctx: &egui::Context, tooltip: &Tooltip) {
    if !tooltip.visible {
        return;
    }

    egui::Area::new(egui::Id::new("marker_tooltip"))
        .fixed_pos(egui::pos2(tooltip.anchor.x, tooltip.anchor.y))
        .order(egui::Order::Tooltip)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(&tooltip.text);
            });
        });
}

/// Bottom status line while loading or after a failed load
pub fn render_status(ctx: &egui::Context, model: &ModelState) {
    let (text, color) = match model {
        ModelState::Ready => return,
        ModelState::Loading => ("Loading model...".to_string(), egui::Color32::LIGHT_GRAY),
        ModelState::Failed(reason) => (format!("Model unavailable: {}", reason), egui::Color32::from_rgb(255, 120, 100)),
    };

    egui::TopBottomPanel::bottom("model_status").show(ctx, |ui| {
        ui.label(egui::RichText::new(text).color(color));
    });
}
