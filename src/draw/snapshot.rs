//! Format-agnostic export of the current features.

use serde::{Deserialize, Serialize};

use crate::geometry::math::circle_ring;
use crate::geometry::{
    close_ring, Coordinate, Feature, FeatureCollection, FeatureId, Geometry, Shape, Style,
};

pub type Position = [f64; 2];

fn position(coordinate: &Coordinate) -> Position {
    [coordinate.x, coordinate.y]
}

fn positions(coordinates: &[Coordinate]) -> Vec<Position> {
    coordinates.iter().map(position).collect()
}

fn coordinate(position: &Position) -> Coordinate {
    Coordinate::new(position[0], position[1])
}

fn coordinates(positions: &[Position]) -> Vec<Coordinate> {
    positions.iter().map(coordinate).collect()
}

fn ring(positions: &[Position]) -> Vec<Coordinate> {
    close_ring(coordinates(positions))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SnapshotGeometry {
    Point {
        coordinates: Position,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    /// Exported both exactly and as a sampled closed ring
    Circle {
        center: Position,
        radius: f64,
        polygon: Vec<Position>,
    },
    GeometryCollection {
        geometries: Vec<SnapshotGeometry>,
    },
}

impl SnapshotGeometry {
    pub fn from_geometry(geometry: &Geometry, circle_segments: usize) -> Self {
        match &geometry.shape {
            Shape::Point(p) => SnapshotGeometry::Point {
                coordinates: position(p),
            },
            Shape::MultiPoint(points) => SnapshotGeometry::MultiPoint {
                coordinates: positions(points),
            },
            Shape::LineString(coords) => SnapshotGeometry::LineString {
                coordinates: positions(coords),
            },
            Shape::MultiLineString(lines) => SnapshotGeometry::MultiLineString {
                coordinates: lines.iter().map(|l| positions(l)).collect(),
            },
            Shape::Polygon(rings) => SnapshotGeometry::Polygon {
                coordinates: rings.iter().map(|r| positions(r)).collect(),
            },
            Shape::MultiPolygon(polygons) => SnapshotGeometry::MultiPolygon {
                coordinates: polygons
                    .iter()
                    .map(|rings| rings.iter().map(|r| positions(r)).collect())
                    .collect(),
            },
            Shape::Circle { center, radius } => SnapshotGeometry::Circle {
                center: position(center),
                radius: *radius,
                polygon: positions(&circle_ring(*center, *radius, circle_segments)),
            },
            Shape::Collection(members) => SnapshotGeometry::GeometryCollection {
                geometries: members
                    .iter()
                    .map(|m| SnapshotGeometry::from_geometry(m, circle_segments))
                    .collect(),
            },
        }
    }

    /// Rebuild an editable geometry; open rings are closed, circles keep center/radius
    pub fn to_geometry(&self) -> Geometry {
        let shape = match self {
            SnapshotGeometry::Point { coordinates } => Shape::Point(coordinate(coordinates)),
            SnapshotGeometry::MultiPoint { coordinates: points } => Shape::MultiPoint(coordinates(points)),
            SnapshotGeometry::LineString { coordinates: line } => Shape::LineString(coordinates(line)),
            SnapshotGeometry::MultiLineString { coordinates: lines } => {
                Shape::MultiLineString(lines.iter().map(|l| coordinates(l)).collect())
            }
            SnapshotGeometry::Polygon { coordinates: rings } => {
                Shape::Polygon(rings.iter().map(|r| ring(r)).collect())
            }
            SnapshotGeometry::MultiPolygon { coordinates: polygons } => Shape::MultiPolygon(
                polygons
                    .iter()
                    .map(|rings| rings.iter().map(|r| ring(r)).collect())
                    .collect(),
            ),
            SnapshotGeometry::Circle { center, radius, .. } => {
                return Geometry::circle(coordinate(center), *radius);
            }
            SnapshotGeometry::GeometryCollection { geometries } => {
                Shape::Collection(geometries.iter().map(SnapshotGeometry::to_geometry).collect())
            }
        };
        Geometry::new(shape)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFeature {
    pub id: FeatureId,
    pub feature_type: String,
    pub style: Style,
    pub properties: serde_json::Map<String, serde_json::Value>,
    pub geometry: SnapshotGeometry,
}

impl SnapshotFeature {
    pub fn from_feature(feature: &Feature, circle_segments: usize) -> Self {
        Self {
            id: feature.id(),
            feature_type: feature.tags.feature_type.clone(),
            style: feature.tags.style.clone(),
            properties: feature.tags.properties.clone(),
            geometry: SnapshotGeometry::from_geometry(&feature.geometry, circle_segments),
        }
    }
}

/// Copy of the current features, detached from the editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub features: Vec<SnapshotFeature>,
}

impl Snapshot {
    pub fn from_features(features: &FeatureCollection, circle_segments: usize) -> Self {
        Self {
            features: features
                .iter()
                .map(|feature| SnapshotFeature::from_feature(feature, circle_segments))
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Failed to serialize snapshot: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::DVec2;

    use super::*;
    use crate::geometry::FeatureTags;

    #[test]
    fn test_snapshot_circle_exports_ring() {
        let mut features = FeatureCollection::default();
        features.insert(Geometry::circle(DVec2::new(1.0, 1.0), 2.0), FeatureTags::default());

        let snapshot = Snapshot::from_features(&features, 16);
        let SnapshotGeometry::Circle {
            center,
            radius,
            polygon,
        } = &snapshot.features[0].geometry
        else {
            panic!("expected a circle");
        };
        assert_eq!(*center, [1.0, 1.0]);
        assert_eq!(*radius, 2.0);
        assert_eq!(polygon.len(), 17);
        assert_eq!(polygon.first(), polygon.last());
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut features = FeatureCollection::default();
        let tags = FeatureTags {
            feature_type: "line".to_string(),
            ..Default::default()
        };
        features.insert(
            Geometry::line_string(vec![DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)]),
            tags,
        );

        let json = Snapshot::from_features(&features, 64).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let feature = &value["features"][0];
        assert_eq!(feature["feature_type"], "line");
        assert_eq!(feature["geometry"]["type"], "LineString");
        assert_eq!(feature["geometry"]["coordinates"], serde_json::json!([[0.0, 0.0], [10.0, 0.0]]));
    }

    #[test]
    fn test_to_geometry_closes_rings() {
        let json = r#"{"type": "Polygon", "coordinates": [[[0, 0], [4, 0], [4, 4]]]}"#;
        let snapshot: SnapshotGeometry = serde_json::from_str(json).unwrap();
        let geometry = snapshot.to_geometry();
        let Shape::Polygon(rings) = &geometry.shape else {
            panic!("expected a polygon");
        };
        assert_eq!(rings[0].len(), 4);
        assert_eq!(rings[0][0], rings[0][3]);
    }

    #[test]
    fn test_to_geometry_circle_ignores_samples() {
        let json = r#"{"type": "Circle", "center": [1, 2], "radius": 3, "polygon": []}"#;
        let snapshot: SnapshotGeometry = serde_json::from_str(json).unwrap();
        assert_eq!(
            snapshot.to_geometry().shape,
            Shape::Circle {
                center: DVec2::new(1.0, 2.0),
                radius: 3.0
            }
        );
    }

    #[test]
    fn test_snapshot_collection_nests() {
        let mut features = FeatureCollection::default();
        features.insert(
            Geometry::collection(vec![Geometry::point(DVec2::ZERO), Geometry::point(DVec2::X)]),
            FeatureTags::default(),
        );
        let snapshot = Snapshot::from_features(&features, 64);
        let SnapshotGeometry::GeometryCollection { geometries } = &snapshot.features[0].geometry else {
            panic!("expected a collection");
        };
        assert_eq!(geometries.len(), 2);
    }
}
