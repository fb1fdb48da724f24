//! Snapping sketch vertices and drags onto other features.

use crate::geometry::math::{closest_on_circle, closest_on_segment};
use crate::geometry::{Coordinate, Extent, Feature, FeatureCollection, FeatureId, Shape};
use crate::index::{write_feature, SegmentIndex, SegmentKind, SegmentRecord};

/// Snap target search over every feature in the collection
pub struct SnapHelper {
    index: SegmentIndex,
    pub enabled: bool,
    pub pixel_tolerance: f64,
}

impl SnapHelper {
    pub fn new(enabled: bool, pixel_tolerance: f64) -> Self {
        Self {
            index: SegmentIndex::new(),
            enabled,
            pixel_tolerance,
        }
    }

    /// Index (or re-index) a feature
    pub fn add_feature(&mut self, feature: &Feature) {
        write_feature(&mut self.index, feature);
    }

    pub fn remove_feature(&mut self, id: FeatureId) {
        self.index.remove_feature(id);
    }

    pub fn clear(&mut self) {
        self.index.clear();
    }

    pub fn index(&self) -> &SegmentIndex {
        &self.index
    }

    /// Nearest vertex within tolerance, else the nearest point on an edge or circle rim.
    ///
    /// Records of `exclude` are ignored so a dragged feature never snaps to itself.
    pub fn snap(
        &self,
        features: &FeatureCollection,
        point: Coordinate,
        resolution: f64,
        exclude: &[FeatureId],
    ) -> Option<Coordinate> {
        if !self.enabled || !(resolution.is_finite() && resolution > 0.0) {
            return None;
        }
        let tolerance = resolution * self.pixel_tolerance;
        let buffer = Extent::around(point, tolerance);

        let mut vertices: Vec<Coordinate> = Vec::new();
        let mut edges: Vec<Coordinate> = Vec::new();
        self.index.for_each_in_extent(&buffer, |_, record| {
            if exclude.contains(&record.feature) {
                return;
            }
            collect_targets(record, features, point, &mut vertices, &mut edges);
        });

        let nearest = |candidates: Vec<Coordinate>| {
            candidates
                .into_iter()
                .filter(|candidate| candidate.distance(point) <= tolerance)
                .min_by(|a, b| a.distance_squared(point).total_cmp(&b.distance_squared(point)))
        };
        nearest(vertices).or_else(|| nearest(edges))
    }
}

fn collect_targets(
    record: &SegmentRecord,
    features: &FeatureCollection,
    point: Coordinate,
    vertices: &mut Vec<Coordinate>,
    edges: &mut Vec<Coordinate>,
) {
    match record.kind {
        SegmentKind::Vertex | SegmentKind::CircleCenter => vertices.push(record.segment[0]),
        SegmentKind::Edge => {
            vertices.extend(record.segment);
            edges.push(closest_on_segment(point, record.segment[0], record.segment[1]));
        }
        SegmentKind::CircleCircumference => {
            if let Some(Shape::Circle { center, radius }) = features
                .geometry(record.feature, record.geometry)
                .map(|geometry| &geometry.shape)
            {
                edges.push(closest_on_circle(point, *center, *radius));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::DVec2;

    use super::*;
    use crate::geometry::{FeatureTags, Geometry};

    fn helper_with(geometries: Vec<Geometry>) -> (SnapHelper, FeatureCollection, Vec<FeatureId>) {
        let mut features = FeatureCollection::default();
        let mut helper = SnapHelper::new(true, 10.0);
        let ids = geometries
            .into_iter()
            .map(|geometry| {
                let id = features.insert(geometry, FeatureTags::default());
                helper.add_feature(features.get(id).unwrap());
                id
            })
            .collect();
        (helper, features, ids)
    }

    #[test]
    fn test_snaps_to_vertex_before_edge() {
        let (helper, features, _) = helper_with(vec![Geometry::line_string(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
        ])]);
        let snapped = helper.snap(&features, DVec2::new(9.5, 0.4), 0.1, &[]);
        assert_eq!(snapped, Some(DVec2::new(10.0, 0.0)));
    }

    #[test]
    fn test_snaps_to_edge_interior() {
        let (helper, features, _) = helper_with(vec![Geometry::line_string(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
        ])]);
        let snapped = helper.snap(&features, DVec2::new(5.0, 0.5), 0.1, &[]);
        assert_eq!(snapped, Some(DVec2::new(5.0, 0.0)));
    }

    #[test]
    fn test_snaps_to_circle_rim() {
        let (helper, features, _) = helper_with(vec![Geometry::circle(DVec2::ZERO, 5.0)]);
        let snapped = helper.snap(&features, DVec2::new(0.0, 5.5), 0.1, &[]);
        assert_eq!(snapped, Some(DVec2::new(0.0, 5.0)));
    }

    #[test]
    fn test_excluded_and_disabled() {
        let (mut helper, features, ids) = helper_with(vec![Geometry::point(DVec2::new(1.0, 1.0))]);
        let pointer = DVec2::new(1.2, 1.0);
        assert_eq!(helper.snap(&features, pointer, 0.1, &[]), Some(DVec2::new(1.0, 1.0)));
        assert_eq!(helper.snap(&features, pointer, 0.1, &ids), None);

        helper.enabled = false;
        assert_eq!(helper.snap(&features, pointer, 0.1, &[]), None);
    }

    #[test]
    fn test_nothing_in_range() {
        let (helper, features, _) = helper_with(vec![Geometry::point(DVec2::new(1.0, 1.0))]);
        assert_eq!(helper.snap(&features, DVec2::new(50.0, 50.0), 0.1, &[]), None);
        assert_eq!(helper.snap(&features, DVec2::new(1.0, 1.0), 0.0, &[]), None);
    }
}
