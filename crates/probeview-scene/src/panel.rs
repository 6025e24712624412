//! Coordinate panel binding and the export action

use probeview_core::{display_fields, export_string};
use thiserror::Error;
use tracing::{info, warn};

use crate::markers::Marker;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("Clipboard write rejected: {0}")]
    Rejected(String),
}

/// System clipboard, written on explicit user action only
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// What the coordinate panel displays
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelBinding {
    pub visible: bool,
    pub name: String,
    /// x, y, z at display precision
    pub fields: [String; 3],
    /// Text of the last export, shown until the selection changes
    pub last_export: Option<String>,
}

impl PanelBinding {
    /// Mirror the marker's name and live position; no-op without a marker
    pub fn refresh(&mut self, marker: Option<&Marker>) -> bool {
        let Some(marker) = marker else {
            return false;
        };
        self.name.clone_from(&marker.name);
        self.fields = display_fields(marker.position.to_array());
        true
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.last_export = None;
    }

    /// Format the marker position at export precision and copy it.
    ///
    /// Clipboard failures are logged, not surfaced; the text is still
    /// returned and kept in `last_export` so it can be copied by hand.
    pub fn export_coordinates(
        &mut self,
        marker: Option<&Marker>,
        clipboard: &mut dyn Clipboard,
    ) -> Option<String> {
        let marker = marker?;
        let text = export_string(marker.position.to_array());

        match clipboard.write_text(&text) {
            Ok(()) => info!(marker = %marker.id, coordinates = %text, "Copied coordinates to clipboard"),
            Err(e) => warn!(marker = %marker.id, coordinates = %text, error = %e, "Clipboard write failed"),
        }

        self.last_export = Some(text.clone());
        Some(text)
    }

    /// Fields joined as `x/y/z`
    pub fn summary(&self) -> String {
        self.fields.join("/")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::markers::PickShape;
    use bevy::prelude::Vec3;

    /// Clipboard double that records writes
    #[derive(Default)]
    pub(crate) struct RecordingClipboard {
        pub writes: Vec<String>,
        pub fail: bool,
    }

    impl Clipboard for RecordingClipboard {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::Rejected("permission denied".to_string()));
            }
            self.writes.push(text.to_string());
            Ok(())
        }
    }

    fn oxygen_sensor() -> Marker {
        Marker::new(1, "Oxygen sensor", Vec3::new(3.5, 1.0, 0.0), PickShape::Sphere { radius: 0.1 })
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let marker = oxygen_sensor();
        let mut panel = PanelBinding::default();

        assert!(panel.refresh(Some(&marker)));
        let first = panel.clone();
        assert!(panel.refresh(Some(&marker)));
        assert_eq!(panel, first);
        assert_eq!(panel.name, "Oxygen sensor");
        assert_eq!(panel.summary(), "3.50/1.00/0.00");
    }

    #[test]
    fn test_guards_without_marker() {
        let mut panel = PanelBinding::default();
        let mut clipboard = RecordingClipboard::default();

        assert!(!panel.refresh(None));
        assert_eq!(panel.export_coordinates(None, &mut clipboard), None);
        assert_eq!(panel, PanelBinding::default());
        assert!(clipboard.writes.is_empty());
    }

    #[test]
    fn test_export_survives_clipboard_failure() {
        let marker = oxygen_sensor();
        let mut panel = PanelBinding::default();
        let mut clipboard = RecordingClipboard { fail: true, ..Default::default() };

        let text = panel.export_coordinates(Some(&marker), &mut clipboard);
        assert_eq!(text.as_deref(), Some("(3.500, 1.000, 0.000)"));
        assert_eq!(panel.last_export.as_deref(), Some("(3.500, 1.000, 0.000)"));

        panel.hide();
        assert!(panel.last_export.is_none());
    }
}
