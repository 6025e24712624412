//! Selection state machine: hover, select, drag
//!
//! The machine owns the interaction state and the highlight of every marker.
//! Camera orbit is derived from the state instead of being tracked on its own:
//! it is disabled exactly while a drag is in progress.

use crate::markers::{MarkerId, MarkerRegistry, MarkerVisual};

/// Current interaction state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Pointer is over a marker that is not selected
    Hovering(MarkerId),
    /// Marker clicked, gizmo attached, not being dragged
    Selected(MarkerId),
    /// Gizmo is actively moving the marker
    Dragging(MarkerId),
}

impl InteractionState {
    pub fn selected(&self) -> Option<MarkerId> {
        match self {
            Self::Selected(id) | Self::Dragging(id) => Some(*id),
            _ => None,
        }
    }

    pub fn hovered(&self) -> Option<MarkerId> {
        match self {
            Self::Hovering(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging(_))
    }

    /// Hover picking and the tooltip only run without a selection
    pub fn allows_hover(&self) -> bool {
        matches!(self, Self::Idle | Self::Hovering(_))
    }

    pub fn orbit_enabled(&self) -> bool {
        !self.is_dragging()
    }
}

/// What a transition changed, for the collaborators to follow up on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    HoverChanged {
        from: Option<MarkerId>,
        to: Option<MarkerId>,
    },
    Selected {
        previous: Option<MarkerId>,
        marker: MarkerId,
    },
    Cleared {
        previous: Option<MarkerId>,
    },
    DragStarted(MarkerId),
    DragEnded(MarkerId),
}

#[derive(Debug, Default)]
pub struct SelectionMachine {
    state: InteractionState,
}

impl SelectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Apply the result of a per-frame hover pick
    pub fn hover(&mut self, hit: Option<MarkerId>, registry: &mut MarkerRegistry) -> Transition {
        if !self.state.allows_hover() {
            return Transition::None;
        }

        let current = self.state.hovered();
        if current == hit {
            return Transition::None;
        }

        if let Some(previous) = current {
            registry.set_visual(previous, MarkerVisual::Normal);
        }
        self.state = match hit {
            Some(marker) => {
                registry.set_visual(marker, MarkerVisual::Hovered);
                InteractionState::Hovering(marker)
            }
            None => InteractionState::Idle,
        };

        Transition::HoverChanged { from: current, to: hit }
    }

    /// Apply a pointer-down with the marker under the pointer, if any
    pub fn pointer_down(&mut self, hit: Option<MarkerId>, registry: &mut MarkerRegistry) -> Transition {
        // A drag owns the pointer; its release must not read as a click.
        if self.state.is_dragging() {
            return Transition::None;
        }

        let previous = self.state.selected();
        let hovered = self.state.hovered();

        match hit {
            Some(marker) => {
                // Restore before highlighting so two markers never read as selected.
                for stale in [previous, hovered].into_iter().flatten() {
                    if stale != marker {
                        registry.set_visual(stale, MarkerVisual::Normal);
                    }
                }
                registry.set_visual(marker, MarkerVisual::Selected);
                self.state = InteractionState::Selected(marker);
                Transition::Selected { previous, marker }
            }
            None => {
                if self.state == InteractionState::Idle {
                    return Transition::None;
                }
                for stale in [previous, hovered].into_iter().flatten() {
                    registry.set_visual(stale, MarkerVisual::Normal);
                }
                self.state = InteractionState::Idle;
                Transition::Cleared { previous }
            }
        }
    }

    /// Gizmo drag-state change: toggles Selected and Dragging
    pub fn drag_changed(&mut self, dragging: bool) -> Transition {
        match (self.state, dragging) {
            (InteractionState::Selected(marker), true) => {
                self.state = InteractionState::Dragging(marker);
                Transition::DragStarted(marker)
            }
            (InteractionState::Dragging(marker), false) => {
                self.state = InteractionState::Selected(marker);
                Transition::DragEnded(marker)
            }
            _ => Transition::None,
        }
    }

    /// Drop any hover or selection unconditionally
    pub fn reset(&mut self, registry: &mut MarkerRegistry) -> Transition {
        let previous = self.state.selected();
        if let Some(marker) = previous.or(self.state.hovered()) {
            registry.set_visual(marker, MarkerVisual::Normal);
        }
        if self.state == InteractionState::Idle {
            return Transition::None;
        }
        self.state = InteractionState::Idle;
        Transition::Cleared { previous }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::{Marker, PickShape};
    use bevy::math::Affine3A;
    use bevy::prelude::Vec3;

    fn registry() -> MarkerRegistry {
        let shape = PickShape::Sphere { radius: 0.1 };
        MarkerRegistry::new(
            Affine3A::IDENTITY,
            vec![
                Marker::new(1, "A", Vec3::ZERO, shape),
                Marker::new(2, "B", Vec3::X, shape),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_hover_moves_highlight() {
        let mut registry = registry();
        let mut machine = SelectionMachine::new();

        machine.hover(Some(MarkerId(1)), &mut registry);
        assert_eq!(machine.state(), InteractionState::Hovering(MarkerId(1)));
        assert_eq!(registry.visual(MarkerId(1)), Some(MarkerVisual::Hovered));

        let transition = machine.hover(Some(MarkerId(2)), &mut registry);
        assert_eq!(
            transition,
            Transition::HoverChanged { from: Some(MarkerId(1)), to: Some(MarkerId(2)) }
        );
        assert_eq!(registry.visual(MarkerId(1)), Some(MarkerVisual::Normal));
        assert_eq!(registry.visual(MarkerId(2)), Some(MarkerVisual::Hovered));

        assert_eq!(machine.hover(Some(MarkerId(2)), &mut registry), Transition::None);

        machine.hover(None, &mut registry);
        assert_eq!(machine.state(), InteractionState::Idle);
        assert_eq!(registry.count_visual(MarkerVisual::Normal), 2);
    }

    #[test]
    fn test_switching_selection_keeps_one_highlight() {
        let mut registry = registry();
        let mut machine = SelectionMachine::new();

        machine.pointer_down(Some(MarkerId(1)), &mut registry);
        let transition = machine.pointer_down(Some(MarkerId(2)), &mut registry);

        assert_eq!(
            transition,
            Transition::Selected { previous: Some(MarkerId(1)), marker: MarkerId(2) }
        );
        assert_eq!(registry.visual(MarkerId(1)), Some(MarkerVisual::Normal));
        assert_eq!(registry.visual(MarkerId(2)), Some(MarkerVisual::Selected));
        assert_eq!(registry.count_visual(MarkerVisual::Selected), 1);
    }

    #[test]
    fn test_selecting_hovered_marker_clears_hover() {
        let mut registry = registry();
        let mut machine = SelectionMachine::new();

        machine.hover(Some(MarkerId(1)), &mut registry);
        machine.pointer_down(Some(MarkerId(2)), &mut registry);

        assert_eq!(registry.count_visual(MarkerVisual::Hovered), 0);
        assert_eq!(registry.visual(MarkerId(2)), Some(MarkerVisual::Selected));
        // Hover picking is suspended while something is selected
        assert_eq!(machine.hover(Some(MarkerId(1)), &mut registry), Transition::None);
    }

    #[test]
    fn test_drag_only_from_selected() {
        let mut registry = registry();
        let mut machine = SelectionMachine::new();

        assert_eq!(machine.drag_changed(true), Transition::None);
        machine.hover(Some(MarkerId(1)), &mut registry);
        assert_eq!(machine.drag_changed(true), Transition::None);

        machine.pointer_down(Some(MarkerId(1)), &mut registry);
        assert!(machine.state().orbit_enabled());
        assert_eq!(machine.drag_changed(true), Transition::DragStarted(MarkerId(1)));
        assert!(!machine.state().orbit_enabled());
        assert_eq!(machine.drag_changed(false), Transition::DragEnded(MarkerId(1)));
        assert!(machine.state().orbit_enabled());
        assert_eq!(machine.state(), InteractionState::Selected(MarkerId(1)));
    }

    #[test]
    fn test_pointer_down_during_drag_is_ignored() {
        let mut registry = registry();
        let mut machine = SelectionMachine::new();

        machine.pointer_down(Some(MarkerId(1)), &mut registry);
        machine.drag_changed(true);

        assert_eq!(machine.pointer_down(None, &mut registry), Transition::None);
        assert_eq!(machine.pointer_down(Some(MarkerId(2)), &mut registry), Transition::None);
        assert_eq!(machine.state(), InteractionState::Dragging(MarkerId(1)));
        assert_eq!(registry.visual(MarkerId(1)), Some(MarkerVisual::Selected));
    }

    #[test]
    fn test_click_empty_space_clears() {
        let mut registry = registry();
        let mut machine = SelectionMachine::new();

        assert_eq!(machine.pointer_down(None, &mut registry), Transition::None);

        machine.pointer_down(Some(MarkerId(1)), &mut registry);
        let transition = machine.pointer_down(None, &mut registry);
        assert_eq!(transition, Transition::Cleared { previous: Some(MarkerId(1)) });
        assert_eq!(machine.state(), InteractionState::Idle);
        assert_eq!(registry.visual(MarkerId(1)), Some(MarkerVisual::Normal));
    }

    #[test]
    fn test_reset_from_dragging() {
        let mut registry = registry();
        let mut machine = SelectionMachine::new();

        machine.pointer_down(Some(MarkerId(2)), &mut registry);
        machine.drag_changed(true);
        assert_eq!(machine.reset(&mut registry), Transition::Cleared { previous: Some(MarkerId(2)) });
        assert_eq!(registry.count_visual(MarkerVisual::Normal), 2);
    }
}
