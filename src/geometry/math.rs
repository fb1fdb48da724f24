//! Closest-point and containment helpers used by hit testing and snapping.

use std::f64::consts::TAU;

use bevy::math::DVec2;

use super::Coordinate;

/// Closest point to `point` on the segment `[start, end]`
pub fn closest_on_segment(point: Coordinate, start: Coordinate, end: Coordinate) -> Coordinate {
    let line_vec = end - start;
    let line_len_sq = line_vec.length_squared();

    if line_len_sq == 0.0 {
        // Segment is a point
        return start;
    }

    // Project point onto line, clamped to segment
    let t = ((point - start).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    start + line_vec * t
}

/// Squared distance from `point` to the segment `[start, end]`
pub fn squared_distance_to_segment(point: Coordinate, start: Coordinate, end: Coordinate) -> f64 {
    point.distance_squared(closest_on_segment(point, start, end))
}

/// Closest point to `point` on the circumference of a circle.
///
/// A pointer exactly on the center resolves to the rightmost rim point.
pub fn closest_on_circle(point: Coordinate, center: Coordinate, radius: f64) -> Coordinate {
    let offset = point - center;
    let direction = offset.try_normalize().unwrap_or(DVec2::X);
    center + direction * radius
}

/// Sample a circle's circumference as a closed ring of `segments + 1` coordinates
pub fn circle_ring(center: Coordinate, radius: f64, segments: usize) -> Vec<Coordinate> {
    let segments = segments.max(3);
    let mut ring: Vec<Coordinate> = (0..segments)
        .map(|i| {
            let angle = TAU * i as f64 / segments as f64;
            center + DVec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect();
    ring.push(ring[0]);
    ring
}

/// Even-odd point-in-ring test; the ring may or may not repeat its first coordinate
pub fn point_in_ring(point: Coordinate, ring: &[Coordinate]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Point-in-polygon test honoring holes: inside the exterior ring and outside every interior ring
pub fn point_in_polygon(point: Coordinate, rings: &[Vec<Coordinate>]) -> bool {
    let Some((exterior, holes)) = rings.split_first() else {
        return false;
    };
    point_in_ring(point, exterior) && !holes.iter().any(|hole| point_in_ring(point, hole))
}
