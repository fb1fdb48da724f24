//! Geometry sum type with stable identity.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::extent::Extent;
use super::Coordinate;

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a geometry; survives coordinate mutation and cloning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub u64);

impl GeometryId {
    pub fn next() -> Self {
        Self(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Geometry kind tag without coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    Circle,
    GeometryCollection,
}

impl GeometryType {
    pub fn display_name(&self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::LineString => "LineString",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPolygon => "MultiPolygon",
            GeometryType::Circle => "Circle",
            GeometryType::GeometryCollection => "GeometryCollection",
        }
    }
}

/// Coordinates of a geometry, by kind.
///
/// Polygon rings are stored closed: the last coordinate repeats the first.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(Coordinate),
    MultiPoint(Vec<Coordinate>),
    LineString(Vec<Coordinate>),
    MultiLineString(Vec<Vec<Coordinate>>),
    Polygon(Vec<Vec<Coordinate>>),
    MultiPolygon(Vec<Vec<Vec<Coordinate>>>),
    Circle { center: Coordinate, radius: f64 },
    Collection(Vec<Geometry>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    id: GeometryId,
    pub shape: Shape,
}

impl Geometry {
    pub fn new(shape: Shape) -> Self {
        Self {
            id: GeometryId::next(),
            shape,
        }
    }

    pub fn point(coordinate: Coordinate) -> Self {
        Self::new(Shape::Point(coordinate))
    }

    pub fn line_string(coordinates: Vec<Coordinate>) -> Self {
        Self::new(Shape::LineString(coordinates))
    }

    /// Polygon from rings; open rings are closed by repeating their first coordinate
    pub fn polygon(rings: Vec<Vec<Coordinate>>) -> Self {
        Self::new(Shape::Polygon(rings.into_iter().map(close_ring).collect()))
    }

    pub fn circle(center: Coordinate, radius: f64) -> Self {
        Self::new(Shape::Circle {
            center,
            radius: radius.abs(),
        })
    }

    pub fn collection(members: Vec<Geometry>) -> Self {
        Self::new(Shape::Collection(members))
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }

    pub fn geometry_type(&self) -> GeometryType {
        match &self.shape {
            Shape::Point(_) => GeometryType::Point,
            Shape::MultiPoint(_) => GeometryType::MultiPoint,
            Shape::LineString(_) => GeometryType::LineString,
            Shape::MultiLineString(_) => GeometryType::MultiLineString,
            Shape::Polygon(_) => GeometryType::Polygon,
            Shape::MultiPolygon(_) => GeometryType::MultiPolygon,
            Shape::Circle { .. } => GeometryType::Circle,
            Shape::Collection(_) => GeometryType::GeometryCollection,
        }
    }

    /// Find this geometry or a collection member by id
    pub fn find(&self, id: GeometryId) -> Option<&Geometry> {
        if self.id == id {
            return Some(self);
        }
        match &self.shape {
            Shape::Collection(members) => members.iter().find_map(|m| m.find(id)),
            _ => None,
        }
    }

    pub fn find_mut(&mut self, id: GeometryId) -> Option<&mut Geometry> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.shape {
            Shape::Collection(members) => members.iter_mut().find_map(|m| m.find_mut(id)),
            _ => None,
        }
    }

    /// Coordinate array addressed by a depth path.
    ///
    /// - LineString, MultiPoint: `[]`
    /// - MultiLineString: `[line]`
    /// - Polygon: `[ring]`
    /// - MultiPolygon: `[polygon, ring]`
    pub fn component(&self, depth: &[usize]) -> Option<&Vec<Coordinate>> {
        match (&self.shape, depth) {
            (Shape::LineString(coords) | Shape::MultiPoint(coords), []) => Some(coords),
            (Shape::MultiLineString(lines), [line]) => lines.get(*line),
            (Shape::Polygon(rings), [ring]) => rings.get(*ring),
            (Shape::MultiPolygon(polygons), [polygon, ring]) => {
                polygons.get(*polygon).and_then(|rings| rings.get(*ring))
            }
            _ => None,
        }
    }

    pub fn component_mut(&mut self, depth: &[usize]) -> Option<&mut Vec<Coordinate>> {
        match (&mut self.shape, depth) {
            (Shape::LineString(coords) | Shape::MultiPoint(coords), []) => Some(coords),
            (Shape::MultiLineString(lines), [line]) => lines.get_mut(*line),
            (Shape::Polygon(rings), [ring]) => rings.get_mut(*ring),
            (Shape::MultiPolygon(polygons), [polygon, ring]) => {
                polygons.get_mut(*polygon).and_then(|rings| rings.get_mut(*ring))
            }
            _ => None,
        }
    }

    /// Whether components of this geometry are closed rings
    pub fn has_rings(&self) -> bool {
        matches!(self.shape, Shape::Polygon(_) | Shape::MultiPolygon(_))
    }

    /// Write a vertex into coordinate slot `slot` of the component at `depth`.
    ///
    /// Point ignores the address. Ring slots 0 and last are the same vertex and are
    /// written together. Circles are edited through [`Geometry::set_circle_center`]
    /// and [`Geometry::set_circle_radius`].
    pub fn set_vertex(&mut self, depth: &[usize], slot: usize, vertex: Coordinate) -> bool {
        if let Shape::Point(point) = &mut self.shape {
            *point = vertex;
            return true;
        }
        let is_ring = self.has_rings();
        let Some(coords) = self.component_mut(depth) else {
            return false;
        };
        if slot >= coords.len() {
            return false;
        }
        coords[slot] = vertex;
        if is_ring {
            let last = coords.len() - 1;
            if slot == 0 {
                coords[last] = vertex;
            } else if slot == last {
                coords[0] = vertex;
            }
        }
        true
    }

    pub fn set_circle_center(&mut self, center: Coordinate) -> bool {
        match &mut self.shape {
            Shape::Circle { center: c, .. } => {
                *c = center;
                true
            }
            _ => false,
        }
    }

    pub fn set_circle_radius(&mut self, radius: f64) -> bool {
        match &mut self.shape {
            Shape::Circle { radius: r, .. } => {
                *r = radius.abs();
                true
            }
            _ => false,
        }
    }

    /// Bounding extent of all coordinates, `None` for empty geometries
    pub fn extent(&self) -> Option<Extent> {
        match &self.shape {
            Shape::Point(p) => Some(Extent::from_point(*p)),
            Shape::MultiPoint(coords) | Shape::LineString(coords) => Extent::from_points(coords),
            Shape::MultiLineString(parts) | Shape::Polygon(parts) => merge_extents(
                parts.iter().filter_map(|coords| Extent::from_points(coords)),
            ),
            Shape::MultiPolygon(polygons) => merge_extents(
                polygons
                    .iter()
                    .flatten()
                    .filter_map(|coords| Extent::from_points(coords)),
            ),
            Shape::Circle { center, radius } => Some(Extent::around(*center, *radius)),
            Shape::Collection(members) => merge_extents(members.iter().filter_map(|m| m.extent())),
        }
    }
}

fn merge_extents(extents: impl Iterator<Item = Extent>) -> Option<Extent> {
    extents.reduce(|a, b| a.merge(&b))
}

/// Repeat the first coordinate at the end of a ring when missing
pub fn close_ring(mut ring: Vec<Coordinate>) -> Vec<Coordinate> {
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied())
        && first != last
    {
        ring.push(first);
    }
    ring
}

#[cfg(test)]
mod tests {
    use bevy::math::DVec2;

    use super::*;

    fn square() -> Geometry {
        Geometry::polygon(vec![vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
        ]])
    }

    #[test]
    fn test_polygon_constructor_closes_rings() {
        let polygon = square();
        let ring = polygon.component(&[0]).unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
    }

    #[test]
    fn test_ids_are_unique_and_survive_clone() {
        let a = Geometry::point(DVec2::ZERO);
        let b = Geometry::point(DVec2::ZERO);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn test_id_survives_mutation() {
        let mut line = Geometry::line_string(vec![DVec2::ZERO, DVec2::X]);
        let id = line.id();
        line.set_vertex(&[], 1, DVec2::new(3.0, 3.0));
        assert_eq!(line.id(), id);
        assert_eq!(line.component(&[]).unwrap()[1], DVec2::new(3.0, 3.0));
    }

    #[test]
    fn test_set_vertex_keeps_ring_closed() {
        let mut polygon = square();
        polygon.set_vertex(&[0], 0, DVec2::new(-1.0, -1.0));
        let ring = polygon.component(&[0]).unwrap();
        assert_eq!(ring[0], DVec2::new(-1.0, -1.0));
        assert_eq!(ring[4], DVec2::new(-1.0, -1.0));

        polygon.set_vertex(&[0], 4, DVec2::new(-2.0, -2.0));
        let ring = polygon.component(&[0]).unwrap();
        assert_eq!(ring[0], DVec2::new(-2.0, -2.0));
    }

    #[test]
    fn test_set_vertex_out_of_range() {
        let mut line = Geometry::line_string(vec![DVec2::ZERO, DVec2::X]);
        assert!(!line.set_vertex(&[], 2, DVec2::ONE));
        assert!(!line.set_vertex(&[0], 0, DVec2::ONE));
    }

    #[test]
    fn test_component_addressing() {
        let multi = Geometry::new(Shape::MultiPolygon(vec![
            vec![vec![DVec2::ZERO, DVec2::X, DVec2::Y, DVec2::ZERO]],
            vec![
                vec![DVec2::ZERO, DVec2::X, DVec2::ONE, DVec2::ZERO],
                vec![DVec2::splat(0.2), DVec2::splat(0.3), DVec2::new(0.2, 0.3), DVec2::splat(0.2)],
            ],
        ]));
        assert_eq!(multi.component(&[1, 1]).unwrap()[0], DVec2::splat(0.2));
        assert!(multi.component(&[2, 0]).is_none());
        assert!(multi.component(&[0]).is_none());
    }

    #[test]
    fn test_find_collection_member() {
        let member = Geometry::circle(DVec2::ZERO, 5.0);
        let member_id = member.id();
        let mut collection = Geometry::collection(vec![Geometry::point(DVec2::ONE), member]);
        assert_eq!(
            collection.find(member_id).map(|g| g.geometry_type()),
            Some(GeometryType::Circle)
        );
        assert!(collection.find_mut(member_id).unwrap().set_circle_radius(7.0));
        assert_eq!(
            collection.find(member_id).unwrap().shape,
            Shape::Circle {
                center: DVec2::ZERO,
                radius: 7.0
            }
        );
    }

    #[test]
    fn test_circle_extent() {
        let circle = Geometry::circle(DVec2::new(1.0, 1.0), 2.0);
        let extent = circle.extent().unwrap();
        assert_eq!(extent.min, DVec2::new(-1.0, -1.0));
        assert_eq!(extent.max, DVec2::new(3.0, 3.0));
    }
}
