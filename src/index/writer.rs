//! Segment writer: the only path that populates the index from geometry.

use bevy::log::error;

use crate::geometry::{Coordinate, Extent, Feature, FeatureId, Geometry, Shape};

use super::record::{
    SegmentKind, SegmentRecord, CIRCLE_CENTER_INDEX, CIRCLE_CIRCUMFERENCE_INDEX,
};
use super::{SegmentId, SegmentIndex};

/// Replace every record of `feature` with a fresh decomposition of its geometry.
///
/// Must run whenever a geometry is replaced wholesale; the drag and
/// insert/remove paths keep the index in sync on their own.
pub fn write_feature(index: &mut SegmentIndex, feature: &Feature) -> Vec<SegmentId> {
    index.remove_feature(feature.id());

    let mut ids = Vec::new();
    let mut previous: Option<(SegmentId, SegmentKind)> = None;
    for (extent, record) in derive_records(feature.id(), &feature.geometry) {
        let kind = record.kind;
        let id = index.insert(extent, record);
        if kind == SegmentKind::CircleCircumference
            && let Some((center, SegmentKind::CircleCenter)) = previous
        {
            index.link_siblings(center, id);
        }
        previous = Some((id, kind));
        ids.push(id);
    }
    ids
}

/// Decompose a geometry into `(extent, record)` pairs without touching any index.
///
/// Circle center and circumference records are emitted back to back.
pub fn derive_records(feature: FeatureId, geometry: &Geometry) -> Vec<(Extent, SegmentRecord)> {
    let mut out = Vec::new();
    write_geometry(feature, geometry, &mut out);
    out
}

fn write_geometry(feature: FeatureId, geometry: &Geometry, out: &mut Vec<(Extent, SegmentRecord)>) {
    let record = |depth: Vec<usize>, index: usize, segment: [Coordinate; 2], kind: SegmentKind| {
        SegmentRecord {
            feature,
            geometry: geometry.id(),
            geometry_type: geometry.geometry_type(),
            depth,
            index,
            segment,
            kind,
            sibling: None,
        }
    };

    match &geometry.shape {
        Shape::Point(p) => {
            out.push((Extent::from_point(*p), record(vec![], 0, [*p, *p], SegmentKind::Vertex)));
        }
        Shape::MultiPoint(points) => {
            for (i, p) in points.iter().enumerate() {
                out.push((Extent::from_point(*p), record(vec![], i, [*p, *p], SegmentKind::Vertex)));
            }
        }
        Shape::LineString(coords) => {
            write_edges(coords, vec![], &record, out);
        }
        Shape::MultiLineString(lines) => {
            for (l, coords) in lines.iter().enumerate() {
                write_edges(coords, vec![l], &record, out);
            }
        }
        Shape::Polygon(rings) => {
            for (r, coords) in rings.iter().enumerate() {
                write_edges(coords, vec![r], &record, out);
            }
        }
        Shape::MultiPolygon(polygons) => {
            for (p, rings) in polygons.iter().enumerate() {
                for (r, coords) in rings.iter().enumerate() {
                    write_edges(coords, vec![p, r], &record, out);
                }
            }
        }
        Shape::Circle { center, radius } => {
            let c = *center;
            out.push((
                Extent::from_point(c),
                record(vec![], CIRCLE_CENTER_INDEX, [c, c], SegmentKind::CircleCenter),
            ));
            out.push((
                Extent::around(c, *radius),
                record(
                    vec![],
                    CIRCLE_CIRCUMFERENCE_INDEX,
                    [c, c],
                    SegmentKind::CircleCircumference,
                ),
            ));
        }
        Shape::Collection(members) => {
            for member in members {
                write_geometry(feature, member, out);
            }
        }
    }
}

fn write_edges(
    coords: &[Coordinate],
    depth: Vec<usize>,
    record: &impl Fn(Vec<usize>, usize, [Coordinate; 2], SegmentKind) -> SegmentRecord,
    out: &mut Vec<(Extent, SegmentRecord)>,
) {
    for (i, pair) in coords.windows(2).enumerate() {
        let segment = [pair[0], pair[1]];
        out.push((
            Extent::new(pair[0], pair[1]),
            record(depth.clone(), i, segment, SegmentKind::Edge),
        ));
    }
}

/// Difference between the indexed records of a feature and a fresh derivation
#[derive(Debug, Clone, PartialEq)]
pub enum IndexMismatch {
    /// Derived from the geometry but absent from the index
    Missing(SegmentRecord),
    /// Present in the index but not derivable from the geometry
    Unexpected(SegmentRecord),
}

/// Re-derive a feature's records and diff them against the index.
///
/// Records are matched on geometry, depth, index, kind and coordinate pair.
/// An empty result means the index is consistent.
pub fn verify_feature(index: &SegmentIndex, feature: &Feature) -> Vec<IndexMismatch> {
    let key = |r: &SegmentRecord| (r.geometry, r.depth.clone(), r.index, r.kind as u8);

    let mut expected: Vec<SegmentRecord> = derive_records(feature.id(), &feature.geometry)
        .into_iter()
        .map(|(_, record)| record)
        .collect();
    let mut actual: Vec<SegmentRecord> = index
        .records_of_feature(feature.id())
        .into_iter()
        .filter_map(|id| index.get(id).cloned())
        .collect();
    expected.sort_by_key(key);
    actual.sort_by_key(key);

    let mut mismatches = Vec::new();
    let mut remaining = actual;
    for wanted in expected {
        let found = remaining.iter().position(|have| {
            key(have) == key(&wanted) && have.segment == wanted.segment
        });
        match found {
            Some(position) => {
                remaining.remove(position);
            }
            None => mismatches.push(IndexMismatch::Missing(wanted)),
        }
    }
    mismatches.extend(remaining.into_iter().map(IndexMismatch::Unexpected));

    if !mismatches.is_empty() {
        error!(
            "Segment index out of sync for feature {:?}: {} mismatched records",
            feature.id(),
            mismatches.len()
        );
    }
    mismatches
}
