//! Pointer mapping: screen coordinates to NDC and tooltip placement

use bevy::prelude::*;

/// Tooltip offset from the pointer, in screen pixels
pub const TOOLTIP_OFFSET: Vec2 = Vec2::new(15.0, 0.0);

/// The on-screen rectangle the 3D view is drawn into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Top-left corner in screen pixels
    pub origin: Vec2,
    pub size: Vec2,
}

impl Viewport {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Viewport covering a whole window of the given size
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(width, height))
    }

    /// Screen position relative to the viewport's top-left corner
    pub fn to_local(&self, screen: Vec2) -> Vec2 {
        screen - self.origin
    }

    /// Normalized device coordinates: x right and y up, both in [-1, 1]
    /// inside the viewport. `None` for a degenerate viewport.
    pub fn to_ndc(&self, screen: Vec2) -> Option<Vec2> {
        if self.size.x <= 0.0 || self.size.y <= 0.0 {
            return None;
        }
        let local = self.to_local(screen);
        Some(Vec2::new(
            local.x / self.size.x * 2.0 - 1.0,
            -(local.y / self.size.y) * 2.0 + 1.0,
        ))
    }
}

/// One pointer sample, mapped for picking and for the tooltip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub ndc: Vec2,
    pub screen: Vec2,
    pub tooltip_anchor: Vec2,
}

/// Last known pointer position; no history is kept
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    sample: Option<PointerSample>,
}

impl PointerState {
    pub fn update(&mut self, viewport: &Viewport, screen: Vec2) {
        self.sample = viewport.to_ndc(screen).map(|ndc| PointerSample {
            ndc,
            screen,
            tooltip_anchor: screen + TOOLTIP_OFFSET,
        });
    }

    pub fn clear(&mut self) {
        self.sample = None;
    }

    pub fn sample(&self) -> Option<&PointerSample> {
        self.sample.as_ref()
    }

    pub fn ndc(&self) -> Option<Vec2> {
        self.sample.map(|s| s.ndc)
    }

    pub fn tooltip_anchor(&self) -> Option<Vec2> {
        self.sample.map(|s| s.tooltip_anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndc_corners() {
        let viewport = Viewport::new(Vec2::new(100.0, 50.0), Vec2::new(800.0, 600.0));
        assert_eq!(viewport.to_ndc(Vec2::new(100.0, 50.0)), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(viewport.to_ndc(Vec2::new(900.0, 650.0)), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(viewport.to_ndc(Vec2::new(500.0, 350.0)), Some(Vec2::ZERO));
    }

    #[test]
    fn test_degenerate_viewport() {
        let viewport = Viewport::from_size(0.0, 600.0);
        assert_eq!(viewport.to_ndc(Vec2::new(10.0, 10.0)), None);

        let mut pointer = PointerState::default();
        pointer.update(&viewport, Vec2::new(10.0, 10.0));
        assert!(pointer.sample().is_none());
    }

    #[test]
    fn test_pointer_overwritten() {
        let viewport = Viewport::new(Vec2::new(10.0, 20.0), Vec2::new(200.0, 100.0));
        let mut pointer = PointerState::default();

        pointer.update(&viewport, Vec2::new(60.0, 45.0));
        pointer.update(&viewport, Vec2::new(110.0, 70.0));

        let sample = pointer.sample().unwrap();
        assert_eq!(sample.screen, Vec2::new(110.0, 70.0));
        assert_eq!(sample.ndc, Vec2::ZERO);
        // Anchor stays in window coordinates even when the viewport is offset
        assert_eq!(sample.tooltip_anchor, Vec2::new(125.0, 70.0));

        pointer.clear();
        assert_eq!(pointer.ndc(), None);
    }
}
