//! Transient vertex marker showing the current snap target.

use crate::geometry::{Coordinate, FeatureId, GeometryId};
use crate::index::SegmentIndex;

use super::hit_test::{Hit, HitKind};

#[derive(Debug, Clone, PartialEq)]
pub struct VertexMarker {
    pub position: Coordinate,
    /// (feature, geometry) pairs the marker straddles; more than one on shared vertices
    pub owners: Vec<(FeatureId, GeometryId)>,
    pub hit: Hit,
}

impl VertexMarker {
    pub fn from_hit(hit: Hit, index: &SegmentIndex) -> Self {
        Self {
            position: hit.position,
            owners: hit.owners(index),
            hit,
        }
    }

    pub fn is_vertex(&self) -> bool {
        self.hit.kind == HitKind::Vertex
    }

    pub fn features(&self) -> Vec<FeatureId> {
        let mut features: Vec<FeatureId> = Vec::new();
        for (feature, _) in &self.owners {
            if !features.contains(feature) {
                features.push(*feature);
            }
        }
        features
    }
}
