//! Click selection of whole features.

use bevy::math::Vec2;

use crate::geometry::math::point_in_polygon;
use crate::geometry::{Coordinate, FeatureCollection, FeatureId, Geometry, Shape};
use crate::index::SegmentIndex;
use crate::modify::hit_test;

/// Pointer travel in pixels below which a press/release pair counts as a click
pub const CLICK_THRESHOLD_PIXELS: f32 = 4.0;

/// Tracks a press so the matching release can be classified as a click
#[derive(Debug, Default)]
pub struct SelectTool {
    press: Option<Vec2>,
}

impl SelectTool {
    pub fn press(&mut self, pixel: Vec2) {
        self.press = Some(pixel);
    }

    /// Forget the press (another tool took the pointer)
    pub fn reset(&mut self) {
        self.press = None;
    }

    /// Whether the release completes a click
    pub fn release(&mut self, pixel: Vec2) -> bool {
        self.press
            .take()
            .is_some_and(|press| press.distance(pixel) <= CLICK_THRESHOLD_PIXELS)
    }
}

/// Feature under `point`: the nearest one within tolerance, else an area containing it
pub fn pick_feature(
    index: &SegmentIndex,
    features: &FeatureCollection,
    point: Coordinate,
    resolution: f64,
    pixel_tolerance: f64,
) -> Option<FeatureId> {
    if let Some(hit) = hit_test(index, features, point, resolution, pixel_tolerance) {
        return index.get(hit.segment).map(|record| record.feature);
    }
    if !(resolution.is_finite() && resolution > 0.0) {
        return None;
    }
    features
        .iter()
        .find(|feature| contains_point(&feature.geometry, point))
        .map(|feature| feature.id())
}

fn contains_point(geometry: &Geometry, point: Coordinate) -> bool {
    match &geometry.shape {
        Shape::Polygon(rings) => point_in_polygon(point, rings),
        Shape::MultiPolygon(polygons) => polygons.iter().any(|rings| point_in_polygon(point, rings)),
        Shape::Circle { center, radius } => center.distance(point) <= *radius,
        Shape::Collection(members) => members.iter().any(|member| contains_point(member, point)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::DVec2;

    use super::*;
    use crate::geometry::FeatureTags;
    use crate::index::write_feature;

    fn indexed(geometries: Vec<Geometry>) -> (SegmentIndex, FeatureCollection, Vec<FeatureId>) {
        let mut features = FeatureCollection::default();
        let mut index = SegmentIndex::new();
        let ids = geometries
            .into_iter()
            .map(|geometry| {
                let id = features.insert(geometry, FeatureTags::default());
                write_feature(&mut index, features.get(id).unwrap());
                id
            })
            .collect();
        (index, features, ids)
    }

    #[test]
    fn test_click_classification() {
        let mut tool = SelectTool::default();
        assert!(!tool.release(Vec2::ZERO));

        tool.press(Vec2::new(10.0, 10.0));
        assert!(tool.release(Vec2::new(12.0, 11.0)));

        tool.press(Vec2::new(10.0, 10.0));
        assert!(!tool.release(Vec2::new(40.0, 10.0)));
    }

    #[test]
    fn test_pick_by_segment_then_area() {
        let square = Geometry::polygon(vec![vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
        ]]);
        let line = Geometry::line_string(vec![DVec2::new(20.0, 0.0), DVec2::new(30.0, 0.0)]);
        let (index, features, ids) = indexed(vec![square, line]);

        assert_eq!(pick_feature(&index, &features, DVec2::new(25.0, 0.3), 0.1, 10.0), Some(ids[1]));
        assert_eq!(pick_feature(&index, &features, DVec2::new(5.0, 5.0), 0.1, 10.0), Some(ids[0]));
        assert_eq!(pick_feature(&index, &features, DVec2::new(15.0, 5.0), 0.1, 10.0), None);
    }

    #[test]
    fn test_pick_inside_circle() {
        let (index, features, ids) = indexed(vec![Geometry::circle(DVec2::ZERO, 5.0)]);
        assert_eq!(pick_feature(&index, &features, DVec2::new(1.0, 1.0), 0.1, 10.0), Some(ids[0]));
    }
}
