//! Common types shared across multiple modules.
//!
//! The pointer event stream consumed by both the modification engine and the
//! drawing orchestrator lives here.

use bevy::math::{DVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::geometry::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// Modifier keys held while the event fired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
}

/// One pointer sample in both screen and map space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Screen position in pixels
    pub pixel: Vec2,
    /// Map position in map units
    pub coordinate: Coordinate,
    /// Map units per pixel of the current view
    pub resolution: f64,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Event at a map coordinate; the pixel is derived from the resolution
    pub fn new(kind: PointerKind, coordinate: Coordinate, resolution: f64) -> Self {
        let pixel = if resolution > 0.0 {
            (coordinate / resolution).as_vec2()
        } else {
            Vec2::ZERO
        };
        Self {
            kind,
            pixel,
            coordinate,
            resolution,
            modifiers: Modifiers::default(),
        }
    }

    pub fn down(x: f64, y: f64, resolution: f64) -> Self {
        Self::new(PointerKind::Down, DVec2::new(x, y), resolution)
    }

    pub fn moved(x: f64, y: f64, resolution: f64) -> Self {
        Self::new(PointerKind::Move, DVec2::new(x, y), resolution)
    }

    pub fn up(x: f64, y: f64, resolution: f64) -> Self {
        Self::new(PointerKind::Up, DVec2::new(x, y), resolution)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Same event relocated to another map coordinate (used by snapping)
    pub fn at(mut self, coordinate: Coordinate) -> Self {
        self.coordinate = coordinate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_derived_from_resolution() {
        let event = PointerEvent::down(10.0, 20.0, 0.5);
        assert_eq!(event.pixel, Vec2::new(20.0, 40.0));
        assert_eq!(event.kind, PointerKind::Down);
    }

    #[test]
    fn test_invalid_resolution_yields_zero_pixel() {
        let event = PointerEvent::moved(10.0, 20.0, 0.0);
        assert_eq!(event.pixel, Vec2::ZERO);
    }

    #[test]
    fn test_modifiers_default_to_released() {
        let modifiers = Modifiers::default();
        assert!(!modifiers.alt && !modifiers.shift && !modifiers.ctrl);
    }

    #[test]
    fn test_at_keeps_kind_and_resolution() {
        let event = PointerEvent::up(1.0, 1.0, 2.0).at(DVec2::new(3.0, 4.0));
        assert_eq!(event.kind, PointerKind::Up);
        assert_eq!(event.coordinate, DVec2::new(3.0, 4.0));
        assert_eq!(event.resolution, 2.0);
    }

    #[test]
    fn test_pointer_kind_serialization() {
        let json = serde_json::to_string(&PointerKind::Down).unwrap();
        assert_eq!(json, "\"down\"");
    }
}
