//! Segment records: 2-point slices of a geometry's coordinate arrays.

use crate::geometry::{Coordinate, Extent, FeatureId, GeometryId, GeometryType};

/// Arena key of a record inside a [`super::SegmentIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub u64);

/// Index of the circle center record
pub const CIRCLE_CENTER_INDEX: usize = 0;
/// Index of the circle circumference record
pub const CIRCLE_CIRCUMFERENCE_INDEX: usize = 1;

/// What a record's coordinate pair stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Zero-length record of a Point or MultiPoint member
    Vertex,
    /// Real segment between two consecutive coordinates
    Edge,
    /// Zero-length record at a circle's center
    CircleCenter,
    /// The circle rim; its pair holds the center, its extent the circle bounds
    CircleCircumference,
}

/// Which end of a record a grabbed vertex occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragSide {
    /// `segment[0]`, coordinate slot `index`
    Start,
    /// `segment[1]`, coordinate slot `index + 1`
    End,
}

impl DragSide {
    pub fn slot(&self, index: usize) -> usize {
        match self {
            DragSide::Start => index,
            DragSide::End => index + 1,
        }
    }

    pub fn position(&self) -> usize {
        match self {
            DragSide::Start => 0,
            DragSide::End => 1,
        }
    }
}

/// Back-reference from the index into one slice of a feature's geometry
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRecord {
    pub feature: FeatureId,
    /// Leaf geometry owning the coordinates (a collection member, not the collection)
    pub geometry: GeometryId,
    /// Local type of `geometry`
    pub geometry_type: GeometryType,
    /// Ring / part path locating the coordinate array (see [`crate::geometry::Geometry::component`])
    pub depth: Vec<usize>,
    /// Position of `segment[0]` within the component
    pub index: usize,
    pub segment: [Coordinate; 2],
    pub kind: SegmentKind,
    /// Center <-> circumference link for circles
    pub sibling: Option<SegmentId>,
}

impl SegmentRecord {
    /// Whether both records address the same coordinate array
    pub fn same_component(&self, other: &SegmentRecord) -> bool {
        self.feature == other.feature && self.geometry == other.geometry && self.depth == other.depth
    }

    /// Extent of the coordinate pair. Circumference records are indexed by the
    /// circle bounds instead, which only the owning geometry knows.
    pub fn segment_extent(&self) -> Extent {
        Extent::new(self.segment[0], self.segment[1])
    }

    /// Side of this record sitting exactly on `vertex`, preferring the start
    pub fn side_of(&self, vertex: Coordinate) -> Option<DragSide> {
        if self.segment[0] == vertex {
            Some(DragSide::Start)
        } else if self.segment[1] == vertex {
            Some(DragSide::End)
        } else {
            None
        }
    }

    pub fn is_circle(&self) -> bool {
        matches!(
            self.kind,
            SegmentKind::CircleCenter | SegmentKind::CircleCircumference
        )
    }
}
