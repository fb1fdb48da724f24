//! Drag session state machine and the per-tick geometry rewrite.

use std::mem;

use crate::geometry::{Coordinate, Extent, FeatureCollection, FeatureId, Geometry, Shape};
use crate::index::{DragSide, SegmentId, SegmentIndex, SegmentKind};

/// One grabbed end of a segment record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragHandle {
    pub segment: SegmentId,
    pub side: DragSide,
}

/// State carried between pointer-down and pointer-up
#[derive(Debug, Clone)]
pub struct ActiveDrag {
    pub handles: Vec<DragHandle>,
    /// Distinct features touched, in first-touch order
    pub features: Vec<FeatureId>,
    /// Geometries as they were when the session armed, restored on cancel
    pub originals: Vec<(FeatureId, Geometry)>,
}

impl ActiveDrag {
    /// Capture the handles and a copy of every geometry they touch
    pub fn capture(handles: Vec<DragHandle>, owners: &[FeatureId], features: &FeatureCollection) -> Self {
        let mut touched: Vec<FeatureId> = Vec::new();
        for id in owners {
            if !touched.contains(id) {
                touched.push(*id);
            }
        }
        let originals = touched
            .iter()
            .filter_map(|id| features.get(*id).map(|f| (*id, f.geometry.clone())))
            .collect();
        Self {
            handles,
            features: touched,
            originals,
        }
    }
}

/// `Idle -> Armed (down on a vertex) -> Dragging (first move) -> Idle (up)`
#[derive(Debug, Clone, Default)]
pub enum DragSession {
    #[default]
    Idle,
    /// Vertex grabbed, nothing moved yet
    Armed(ActiveDrag),
    /// Geometry mutated; "start" has fired
    Dragging(ActiveDrag),
}

impl DragSession {
    pub fn is_idle(&self) -> bool {
        matches!(self, DragSession::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragSession::Dragging(_))
    }

    pub fn active(&self) -> Option<&ActiveDrag> {
        match self {
            DragSession::Idle => None,
            DragSession::Armed(drag) | DragSession::Dragging(drag) => Some(drag),
        }
    }

    /// Features touched by the current session (empty when idle)
    pub fn batch(&self) -> &[FeatureId] {
        self.active().map(|drag| drag.features.as_slice()).unwrap_or(&[])
    }

    /// Leave the session, returning whatever state it was in
    pub fn take(&mut self) -> DragSession {
        mem::take(self)
    }
}

/// Move every handle to `vertex`, rewriting geometry coordinates and index records
pub fn apply_drag(
    index: &mut SegmentIndex,
    features: &mut FeatureCollection,
    handles: &[DragHandle],
    vertex: Coordinate,
) {
    for handle in handles {
        let Some(record) = index.get(handle.segment).cloned() else {
            continue;
        };
        let Some(geometry) = features.geometry_mut(record.feature, record.geometry) else {
            continue;
        };

        match record.kind {
            SegmentKind::CircleCenter => {
                geometry.set_circle_center(vertex);
                let radius = match geometry.shape {
                    Shape::Circle { radius, .. } => radius,
                    _ => 0.0,
                };
                index.set_segment(handle.segment, [vertex, vertex]);
                index.update(handle.segment, Extent::from_point(vertex));
                if let Some(rim) = record.sibling {
                    index.set_segment(rim, [vertex, vertex]);
                    index.update(rim, Extent::around(vertex, radius));
                }
            }
            SegmentKind::CircleCircumference => {
                let center = record.segment[0];
                let radius = center.distance(vertex);
                geometry.set_circle_radius(radius);
                index.update(handle.segment, Extent::around(center, radius));
            }
            SegmentKind::Vertex => {
                geometry.set_vertex(&record.depth, record.index, vertex);
                index.set_segment(handle.segment, [vertex, vertex]);
                index.update(handle.segment, Extent::from_point(vertex));
            }
            SegmentKind::Edge => {
                geometry.set_vertex(&record.depth, handle.side.slot(record.index), vertex);
                index.set_segment_end(handle.segment, handle.side.position(), vertex);
                let mut segment = record.segment;
                segment[handle.side.position()] = vertex;
                index.update(handle.segment, Extent::new(segment[0], segment[1]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::DVec2;

    use super::*;
    use crate::geometry::FeatureTags;

    #[test]
    fn test_session_default_is_idle() {
        let session = DragSession::default();
        assert!(session.is_idle());
        assert!(session.batch().is_empty());
        assert!(session.active().is_none());
    }

    #[test]
    fn test_capture_dedupes_features_and_copies_geometry() {
        let mut features = FeatureCollection::default();
        let id = features.insert(
            Geometry::line_string(vec![DVec2::ZERO, DVec2::X]),
            FeatureTags::default(),
        );
        let drag = ActiveDrag::capture(vec![], &[id, id], &features);
        assert_eq!(drag.features, vec![id]);
        assert_eq!(drag.originals.len(), 1);
        assert_eq!(drag.originals[0].1, features.get(id).unwrap().geometry);
    }

    #[test]
    fn test_take_resets_to_idle() {
        let mut session = DragSession::Armed(ActiveDrag {
            handles: vec![],
            features: vec![FeatureId(3)],
            originals: vec![],
        });
        assert_eq!(session.batch(), &[FeatureId(3)]);
        let previous = session.take();
        assert!(matches!(previous, DragSession::Armed(_)));
        assert!(session.is_idle());
    }
}
