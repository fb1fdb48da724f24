//! Vertex insertion and removal with index renumbering.

use bevy::log::debug;

use crate::geometry::{Coordinate, Extent, FeatureCollection, FeatureId, Geometry, GeometryId, Shape};
use crate::index::{DragSide, SegmentId, SegmentIndex, SegmentKind, SegmentRecord};

/// Minimum stored coordinates of a line component
pub const MIN_LINE_COORDINATES: usize = 2;
/// Minimum stored coordinates of a ring: 3 distinct plus the closing duplicate
pub const MIN_RING_COORDINATES: usize = 4;

/// Split an edge record at `vertex`.
///
/// Returns the two new records `(left, right)` sharing the new vertex, or
/// `None` when the record is not an edge or its geometry is gone.
pub fn insert_vertex(
    index: &mut SegmentIndex,
    features: &mut FeatureCollection,
    segment: SegmentId,
    vertex: Coordinate,
) -> Option<(SegmentId, SegmentId)> {
    let record = index.get(segment)?.clone();
    if record.kind != SegmentKind::Edge {
        return None;
    }

    let geometry = features.geometry_mut(record.feature, record.geometry)?;
    let coords = geometry.component_mut(&record.depth)?;
    if record.index + 1 >= coords.len() {
        return None;
    }
    coords.insert(record.index + 1, vertex);

    index.remove(segment);
    index.renumber_after(record.feature, record.geometry, &record.depth, record.index, 1);

    let left = SegmentRecord {
        segment: [record.segment[0], vertex],
        ..record.clone()
    };
    let right = SegmentRecord {
        index: record.index + 1,
        segment: [vertex, record.segment[1]],
        ..record
    };
    let left_id = index.insert(left.segment_extent(), left);
    let right_id = index.insert(right.segment_extent(), right);
    Some((left_id, right_id))
}

/// Records grabbed at one vertex, grouped per coordinate array
struct VertexGroup {
    feature: FeatureId,
    geometry: GeometryId,
    depth: Vec<usize>,
    /// Edge records touching the vertex, with the side they touch it on
    edges: Vec<(SegmentId, SegmentRecord, DragSide)>,
    /// Point-like record sitting on the vertex
    point: Option<(SegmentId, SegmentRecord)>,
}

fn group_vertex_segments(index: &SegmentIndex, vertex_segments: &[(SegmentId, DragSide)]) -> Vec<VertexGroup> {
    let mut groups: Vec<VertexGroup> = Vec::new();
    for (id, side) in vertex_segments {
        let Some(record) = index.get(*id).cloned() else {
            continue;
        };
        let position = groups.iter().position(|g| {
            g.feature == record.feature && g.geometry == record.geometry && g.depth == record.depth
        });
        let group = match position {
            Some(position) => &mut groups[position],
            None => {
                groups.push(VertexGroup {
                    feature: record.feature,
                    geometry: record.geometry,
                    depth: record.depth.clone(),
                    edges: Vec::new(),
                    point: None,
                });
                let last = groups.len() - 1;
                &mut groups[last]
            }
        };
        match record.kind {
            SegmentKind::Edge => group.edges.push((*id, record, *side)),
            _ => group.point = Some((*id, record)),
        }
    }
    groups
}

/// Which coordinate to splice out of a component and which records border it
struct EdgeRemoval {
    slot: usize,
    /// Slot 0 of a closed component; the closing duplicate is rewritten too
    closed_start: bool,
    /// Record ending at the vertex
    left: Option<(SegmentId, SegmentRecord)>,
    /// Record starting at the vertex
    right: Option<(SegmentId, SegmentRecord)>,
}

/// Pick one vertex slot of the component and its bordering records.
///
/// A component touching the vertex more than once loses only the lowest slot.
/// Returns `None` when the records on hand do not border that slot on every
/// side it has a neighbour.
fn plan_edge_removal(group: &VertexGroup, coords: &[Coordinate]) -> Option<EdgeRemoval> {
    if coords.len() < 2 {
        return None;
    }
    let last = coords.len() - 1;
    let closed = coords[0] == coords[last];

    let slot = group
        .edges
        .iter()
        .map(|(_, record, side)| side.slot(record.index))
        .map(|slot| if closed && slot == last { 0 } else { slot })
        .min()?;
    let closed_start = closed && slot == 0;

    let left_index = match slot {
        0 if closed_start => Some(last - 1),
        0 => None,
        slot => Some(slot - 1),
    };
    let right_index = (slot < last).then_some(slot);

    let find = |wanted: Option<usize>, side: DragSide| {
        wanted.map(|wanted| {
            group
                .edges
                .iter()
                .find(|(_, record, s)| *s == side && record.index == wanted)
                .map(|(id, record, _)| (*id, record.clone()))
        })
    };
    let left = find(left_index, DragSide::End);
    let right = find(right_index, DragSide::Start);
    // A missing neighbour record would leave the index out of step with the coordinates
    if matches!(left, Some(None)) || matches!(right, Some(None)) {
        return None;
    }

    Some(EdgeRemoval {
        slot,
        closed_start,
        left: left.flatten(),
        right: right.flatten(),
    })
}

/// Whether the component can lose a vertex under `removal`
fn removal_keeps_minimum(removal: &EdgeRemoval, coords: &[Coordinate], is_ring: bool) -> bool {
    if is_ring {
        coords.len() > MIN_RING_COORDINATES
    } else if removal.closed_start {
        // A closed line must keep two distinct points plus the closing duplicate
        coords.len() > MIN_LINE_COORDINATES + 1
    } else {
        coords.len() > MIN_LINE_COORDINATES
    }
}

/// Whether removing the vertex from this group keeps the geometry valid
fn group_removable(group: &VertexGroup, geometry: &Geometry) -> bool {
    if let Some((_, record)) = &group.point {
        return match (&geometry.shape, record.kind) {
            (Shape::MultiPoint(points), SegmentKind::Vertex) => points.len() > 1,
            _ => false,
        };
    }
    let Some(coords) = geometry.component(&group.depth) else {
        return false;
    };
    plan_edge_removal(group, coords)
        .is_some_and(|removal| removal_keeps_minimum(&removal, coords, geometry.has_rings()))
}

/// Whether at least one geometry behind these records would accept removal of the vertex
pub fn can_remove_vertex(
    index: &SegmentIndex,
    features: &FeatureCollection,
    vertex_segments: &[(SegmentId, DragSide)],
) -> bool {
    group_vertex_segments(index, vertex_segments).iter().any(|group| {
        features
            .geometry(group.feature, group.geometry)
            .is_some_and(|geometry| group_removable(group, geometry))
    })
}

/// Remove the vertex grabbed by `vertex_segments` from every geometry sharing it.
///
/// Geometries that would drop below their minimum point count are left alone.
/// Returns the features that changed.
pub fn remove_vertex(
    index: &mut SegmentIndex,
    features: &mut FeatureCollection,
    vertex_segments: &[(SegmentId, DragSide)],
) -> Vec<FeatureId> {
    let mut modified = Vec::new();
    for group in group_vertex_segments(index, vertex_segments) {
        let Some(geometry) = features.geometry_mut(group.feature, group.geometry) else {
            continue;
        };
        if !group_removable(&group, geometry) {
            debug!(
                "Refusing vertex removal on {:?} depth {:?}: minimum point count",
                group.geometry, group.depth
            );
            continue;
        }

        let removed = if let Some((id, record)) = &group.point {
            remove_point_member(index, geometry, *id, record)
        } else {
            remove_edge_vertex(index, geometry, &group)
        };
        if removed && !modified.contains(&group.feature) {
            modified.push(group.feature);
        }
    }
    modified
}

fn remove_point_member(
    index: &mut SegmentIndex,
    geometry: &mut Geometry,
    id: SegmentId,
    record: &SegmentRecord,
) -> bool {
    let Shape::MultiPoint(points) = &mut geometry.shape else {
        return false;
    };
    if record.index >= points.len() {
        return false;
    }
    points.remove(record.index);
    index.remove(id);
    index.renumber_after(record.feature, record.geometry, &record.depth, record.index, -1);
    true
}

fn remove_edge_vertex(index: &mut SegmentIndex, geometry: &mut Geometry, group: &VertexGroup) -> bool {
    let is_ring = geometry.has_rings();
    let Some(coords) = geometry.component_mut(&group.depth) else {
        return false;
    };
    let Some(removal) = plan_edge_removal(group, coords) else {
        return false;
    };
    if !removal_keeps_minimum(&removal, coords, is_ring) {
        return false;
    }

    coords.remove(removal.slot);
    if removal.closed_start {
        let new_last = coords.len() - 1;
        coords[new_last] = coords[0];
    }

    if let Some((id, _)) = &removal.left {
        index.remove(*id);
    }
    if let Some((id, _)) = &removal.right {
        index.remove(*id);
    }
    index.renumber_after(group.feature, group.geometry, &group.depth, removal.slot, -1);

    // Bridge the gap between the two neighbours
    if let (Some((_, left)), Some((_, right))) = (&removal.left, &removal.right) {
        let joined = SegmentRecord {
            index: if removal.closed_start { left.index - 1 } else { left.index },
            segment: [left.segment[0], right.segment[1]],
            ..left.clone()
        };
        index.insert(Extent::new(joined.segment[0], joined.segment[1]), joined);
    }
    true
}
