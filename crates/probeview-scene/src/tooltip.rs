//! Floating label for the hovered marker

use bevy::prelude::*;

use crate::markers::Marker;
use crate::pointer::PointerState;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tooltip {
    pub visible: bool,
    pub text: String,
    /// Top-left of the label, in window coordinates
    pub anchor: Vec2,
}

impl Tooltip {
    /// Show the hovered marker's name next to the pointer, or hide
    pub fn present(&mut self, hovered: Option<&Marker>, pointer: &PointerState) {
        match (hovered, pointer.tooltip_anchor()) {
            (Some(marker), Some(anchor)) => {
                self.visible = true;
                self.text.clone_from(&marker.name);
                self.anchor = anchor;
            }
            _ => self.hide(),
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}
