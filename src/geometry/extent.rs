//! Axis-aligned extents in map units.

use bevy::math::DVec2;
use rstar::AABB;
use rstar::primitives::Rectangle;

use super::Coordinate;

/// Axis-aligned bounding box (min, max corners)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl Extent {
    pub fn new(min: Coordinate, max: Coordinate) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Degenerate extent covering a single coordinate
    pub fn from_point(point: Coordinate) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Smallest extent containing every coordinate, `None` for an empty slice
    pub fn from_points(points: &[Coordinate]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut extent = Self::from_point(*first);
        for &p in rest {
            extent.extend(p);
        }
        Some(extent)
    }

    /// Square extent of half-width `half` centered on `center`
    pub fn around(center: Coordinate, half: f64) -> Self {
        let half = DVec2::splat(half.abs());
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn extend(&mut self, point: Coordinate) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn merge(&self, other: &Extent) -> Extent {
        Extent {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Closed-interval overlap test (touching edges intersect)
    pub fn intersects(&self, other: &Extent) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn center(&self) -> Coordinate {
        (self.min + self.max) / 2.0
    }

    pub(crate) fn to_aabb(self) -> AABB<[f64; 2]> {
        AABB::from_corners(self.min.to_array(), self.max.to_array())
    }

    pub(crate) fn to_rectangle(self) -> Rectangle<[f64; 2]> {
        Rectangle::from_corners(self.min.to_array(), self.max.to_array())
    }
}
