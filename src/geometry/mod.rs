//! Editable geometry model.
//!
//! ## Module Structure
//!
//! - [`extent`] - Axis-aligned extents used by the segment index and hit tester
//! - [`math`] - Closest-point, circle sampling and containment helpers
//! - [`shape`] - [`Geometry`] sum type with stable [`GeometryId`]
//! - [`feature`] - [`Feature`], tags, and the owning [`FeatureCollection`]
//!
//! Coordinates are opaque map-unit pairs; no projection math happens here.

mod extent;
mod feature;
pub mod math;
mod shape;

use bevy::math::DVec2;

/// A map-unit coordinate pair
pub type Coordinate = DVec2;

pub use extent::Extent;
pub use feature::{Feature, FeatureCollection, FeatureId, FeatureTags, Style};
pub use shape::{close_ring, Geometry, GeometryId, GeometryType, Shape};
