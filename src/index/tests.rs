//! Unit tests for the segment index and writer.

use bevy::math::DVec2;

use super::*;
use crate::geometry::{Feature, FeatureCollection, FeatureTags, Geometry, GeometryType, Shape};

fn feature_with(geometry: Geometry) -> (FeatureCollection, FeatureId) {
    let mut features = FeatureCollection::default();
    let id = features.insert(geometry, FeatureTags::default());
    (features, id)
}

fn feature<'a>(features: &'a FeatureCollection, id: FeatureId) -> &'a Feature {
    features.get(id).unwrap()
}

fn records(index: &SegmentIndex, ids: &[SegmentId]) -> Vec<SegmentRecord> {
    ids.iter().map(|id| index.get(*id).unwrap().clone()).collect()
}

// Segment index tests
#[test]
fn test_remove_is_idempotent() {
    let (features, id) = feature_with(Geometry::line_string(vec![DVec2::ZERO, DVec2::X]));
    let mut index = SegmentIndex::new();
    let ids = write_feature(&mut index, feature(&features, id));

    assert!(index.remove(ids[0]).is_some());
    assert!(index.remove(ids[0]).is_none());
    assert!(index.is_empty());
}

#[test]
fn test_query_range() {
    let (features, id) = feature_with(Geometry::line_string(vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(10.0, 0.0),
        DVec2::new(10.0, 10.0),
    ]));
    let mut index = SegmentIndex::new();
    let ids = write_feature(&mut index, feature(&features, id));

    let hits = index.query_range(&Extent::around(DVec2::new(5.0, 0.5), 1.0));
    assert_eq!(hits, vec![ids[0]]);

    let hits = index.query_range(&Extent::around(DVec2::new(10.0, 0.0), 0.5));
    assert_eq!(hits, ids);

    let hits = index.query_range(&Extent::around(DVec2::new(50.0, 50.0), 1.0));
    assert!(hits.is_empty());
}

#[test]
fn test_for_each_in_extent_visits_records() {
    let (features, id) = feature_with(Geometry::new(Shape::MultiPoint(vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        DVec2::new(9.0, 9.0),
    ])));
    let mut index = SegmentIndex::new();
    write_feature(&mut index, feature(&features, id));

    let mut visited = Vec::new();
    index.for_each_in_extent(&Extent::new(DVec2::splat(-1.0), DVec2::splat(2.0)), |_, record| {
        visited.push(record.index);
    });
    assert_eq!(visited, vec![0, 1]);
}

#[test]
fn test_update_moves_record() {
    let (features, id) = feature_with(Geometry::point(DVec2::ZERO));
    let mut index = SegmentIndex::new();
    let ids = write_feature(&mut index, feature(&features, id));

    let moved = Extent::from_point(DVec2::new(20.0, 20.0));
    assert!(index.update(ids[0], moved));
    assert!(index.query_range(&Extent::around(DVec2::ZERO, 1.0)).is_empty());
    assert_eq!(index.query_range(&Extent::around(DVec2::new(20.0, 20.0), 1.0)), ids);
    assert_eq!(index.extent_of(ids[0]), Some(moved));
    assert!(!index.update(SegmentId(999), moved));
}

#[test]
fn test_renumber_only_touches_matching_component() {
    let (features, id) = feature_with(Geometry::new(Shape::MultiLineString(vec![
        vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(2.0, 0.0)],
        vec![DVec2::new(0.0, 5.0), DVec2::new(1.0, 5.0), DVec2::new(2.0, 5.0)],
    ])));
    let mut index = SegmentIndex::new();
    let ids = write_feature(&mut index, feature(&features, id));
    let geometry = index.get(ids[0]).unwrap().geometry;

    index.renumber_after(id, geometry, &[0], 0, 1);

    let indices: Vec<(Vec<usize>, usize)> = records(&index, &ids)
        .into_iter()
        .map(|r| (r.depth, r.index))
        .collect();
    assert_eq!(
        indices,
        vec![(vec![0], 0), (vec![0], 2), (vec![1], 0), (vec![1], 1)]
    );
}

#[test]
fn test_renumber_ignores_feature_sharing_geometry_id() {
    let line = Geometry::line_string(vec![DVec2::ZERO, DVec2::X, DVec2::new(2.0, 0.0)]);
    let mut features = FeatureCollection::default();
    let a = features.insert(line.clone(), FeatureTags::default());
    let b = features.insert(line, FeatureTags::default());
    let mut index = SegmentIndex::new();
    let a_ids = write_feature(&mut index, feature(&features, a));
    let b_ids = write_feature(&mut index, feature(&features, b));
    let geometry = index.get(a_ids[0]).unwrap().geometry;
    assert_eq!(index.get(b_ids[0]).unwrap().geometry, geometry);

    index.renumber_after(a, geometry, &[], 0, 1);

    let a_indices: Vec<usize> = records(&index, &a_ids).iter().map(|r| r.index).collect();
    let b_indices: Vec<usize> = records(&index, &b_ids).iter().map(|r| r.index).collect();
    assert_eq!(a_indices, vec![0, 2]);
    assert_eq!(b_indices, vec![0, 1]);
    assert_eq!(index.records_of_geometry(b, geometry), b_ids);
}

#[test]
fn test_remove_feature_leaves_others() {
    let mut features = FeatureCollection::default();
    let a = features.insert(Geometry::point(DVec2::ZERO), FeatureTags::default());
    let b = features.insert(
        Geometry::line_string(vec![DVec2::ZERO, DVec2::X]),
        FeatureTags::default(),
    );
    let mut index = SegmentIndex::new();
    write_feature(&mut index, feature(&features, a));
    write_feature(&mut index, feature(&features, b));

    assert_eq!(index.remove_feature(a), 1);
    assert!(!index.contains_feature(a));
    assert!(index.contains_feature(b));
    assert_eq!(index.remove_feature(a), 0);
}

// Segment writer tests
#[test]
fn test_write_line_string() {
    let (features, id) = feature_with(Geometry::line_string(vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(10.0, 0.0),
        DVec2::new(10.0, 10.0),
    ]));
    let mut index = SegmentIndex::new();
    let ids = write_feature(&mut index, feature(&features, id));
    let written = records(&index, &ids);

    assert_eq!(written.len(), 2);
    assert_eq!(written[0].index, 0);
    assert_eq!(written[0].segment, [DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)]);
    assert_eq!(written[1].index, 1);
    assert_eq!(written[1].segment, [DVec2::new(10.0, 0.0), DVec2::new(10.0, 10.0)]);
    assert!(written.iter().all(|r| r.kind == SegmentKind::Edge && r.depth.is_empty()));
}

#[test]
fn test_write_polygon_rings() {
    let (features, id) = feature_with(Geometry::polygon(vec![
        vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
        ],
        vec![DVec2::new(2.0, 2.0), DVec2::new(4.0, 2.0), DVec2::new(4.0, 4.0)],
    ]));
    let derived = derive_records(id, &feature(&features, id).geometry);

    // 4 edges on the exterior, 3 on the hole
    assert_eq!(derived.len(), 7);
    assert_eq!(derived.iter().filter(|(_, r)| r.depth == vec![0]).count(), 4);
    assert_eq!(derived.iter().filter(|(_, r)| r.depth == vec![1]).count(), 3);
    let closing = &derived[3].1;
    assert_eq!(closing.segment, [DVec2::new(0.0, 10.0), DVec2::new(0.0, 0.0)]);
}

#[test]
fn test_write_multi_polygon_depth() {
    let ring = vec![DVec2::ZERO, DVec2::X, DVec2::ONE, DVec2::ZERO];
    let (features, id) = feature_with(Geometry::new(Shape::MultiPolygon(vec![
        vec![ring.clone()],
        vec![ring.clone(), ring],
    ])));
    let derived = derive_records(id, &feature(&features, id).geometry);

    assert_eq!(derived.len(), 9);
    assert!(derived.iter().any(|(_, r)| r.depth == vec![1, 1] && r.index == 2));
    assert!(derived.iter().all(|(_, r)| r.geometry_type == GeometryType::MultiPolygon));
}

#[test]
fn test_write_circle_links_siblings() {
    let (features, id) = feature_with(Geometry::circle(DVec2::ZERO, 5.0));
    let mut index = SegmentIndex::new();
    let ids = write_feature(&mut index, feature(&features, id));

    assert_eq!(ids.len(), 2);
    let center = index.get(ids[0]).unwrap();
    let rim = index.get(ids[1]).unwrap();
    assert_eq!(center.kind, SegmentKind::CircleCenter);
    assert_eq!(center.index, CIRCLE_CENTER_INDEX);
    assert_eq!(center.sibling, Some(ids[1]));
    assert_eq!(rim.kind, SegmentKind::CircleCircumference);
    assert_eq!(rim.index, CIRCLE_CIRCUMFERENCE_INDEX);
    assert_eq!(rim.sibling, Some(ids[0]));
    assert_eq!(
        index.extent_of(ids[1]),
        Some(Extent::new(DVec2::splat(-5.0), DVec2::splat(5.0)))
    );
}

#[test]
fn test_write_collection_tags_member_types() {
    let point = Geometry::point(DVec2::new(3.0, 3.0));
    let line = Geometry::line_string(vec![DVec2::ZERO, DVec2::X]);
    let (point_id, line_id) = (point.id(), line.id());
    let (features, id) = feature_with(Geometry::collection(vec![point, line]));
    let derived = derive_records(id, &feature(&features, id).geometry);

    assert_eq!(derived.len(), 2);
    assert_eq!(derived[0].1.geometry, point_id);
    assert_eq!(derived[0].1.geometry_type, GeometryType::Point);
    assert_eq!(derived[1].1.geometry, line_id);
    assert_eq!(derived[1].1.geometry_type, GeometryType::LineString);
}

#[test]
fn test_rewrite_replaces_previous_records() {
    let (mut features, id) = feature_with(Geometry::line_string(vec![DVec2::ZERO, DVec2::X]));
    let mut index = SegmentIndex::new();
    write_feature(&mut index, feature(&features, id));

    features.get_mut(id).unwrap().geometry =
        Geometry::line_string(vec![DVec2::ZERO, DVec2::X, DVec2::ONE]);
    write_feature(&mut index, feature(&features, id));

    assert_eq!(index.len(), 2);
    assert!(verify_feature(&index, feature(&features, id)).is_empty());
}

#[test]
fn test_verify_detects_desync() {
    let (mut features, id) = feature_with(Geometry::line_string(vec![DVec2::ZERO, DVec2::X]));
    let mut index = SegmentIndex::new();
    write_feature(&mut index, feature(&features, id));
    assert!(verify_feature(&index, feature(&features, id)).is_empty());

    let geometry = features.get(id).unwrap().geometry.id();
    features
        .geometry_mut(id, geometry)
        .unwrap()
        .set_vertex(&[], 1, DVec2::new(5.0, 5.0));

    let mismatches = verify_feature(&index, feature(&features, id));
    assert_eq!(mismatches.len(), 2);
    assert!(matches!(mismatches[0], IndexMismatch::Missing(_)));
    assert!(matches!(mismatches[1], IndexMismatch::Unexpected(_)));
}
