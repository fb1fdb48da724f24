//! In-progress geometry of the active draw tool.

use crate::config::ToolConfig;
use crate::geometry::{Coordinate, Geometry, GeometryType};

/// Outcome of feeding a click to a [`Sketch`]
#[derive(Debug, Clone, PartialEq)]
pub enum SketchStep {
    /// Vertex added, keep drawing
    Continue,
    /// Sketch complete
    Finished(Geometry),
}

#[derive(Debug, Clone)]
pub struct Sketch {
    tool: String,
    config: ToolConfig,
    points: Vec<Coordinate>,
}

impl Sketch {
    pub fn new(tool: &str, config: ToolConfig) -> Self {
        Self {
            tool: tool.to_string(),
            config,
            points: Vec::new(),
        }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.config.geometry
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn reset(&mut self) {
        self.points.clear();
    }

    /// Add a clicked vertex. `tolerance` is the closing radius in map units.
    pub fn add_point(&mut self, point: Coordinate, tolerance: f64) -> SketchStep {
        match self.config.geometry {
            GeometryType::Point => {
                self.points.clear();
                SketchStep::Finished(Geometry::point(point))
            }
            GeometryType::Circle => match self.points.first().copied() {
                Some(center) => {
                    self.points.clear();
                    SketchStep::Finished(Geometry::circle(center, center.distance(point)))
                }
                None => {
                    self.points.push(point);
                    SketchStep::Continue
                }
            },
            GeometryType::LineString => {
                let on_last = self.points.last().is_some_and(|last| last.distance(point) <= tolerance);
                if on_last && self.points.len() >= self.config.min_points {
                    return self.take();
                }
                if !on_last {
                    self.points.push(point);
                }
                SketchStep::Continue
            }
            GeometryType::Polygon => {
                let on_first = self.points.first().is_some_and(|first| first.distance(point) <= tolerance);
                if on_first && self.points.len() >= self.config.min_points {
                    return self.take();
                }
                let on_last = self.points.last().is_some_and(|last| last.distance(point) <= tolerance);
                if !on_first && !on_last {
                    self.points.push(point);
                }
                SketchStep::Continue
            }
            _ => SketchStep::Continue,
        }
    }

    /// Finish with the vertices so far; `None` below the tool's minimum
    pub fn finish(&mut self) -> Option<Geometry> {
        let closable = matches!(
            self.config.geometry,
            GeometryType::LineString | GeometryType::Polygon
        );
        if !closable || self.points.len() < self.config.min_points {
            return None;
        }
        match self.take() {
            SketchStep::Finished(geometry) => Some(geometry),
            SketchStep::Continue => None,
        }
    }

    fn take(&mut self) -> SketchStep {
        let points = std::mem::take(&mut self.points);
        match self.config.geometry {
            GeometryType::Polygon => SketchStep::Finished(Geometry::polygon(vec![points])),
            _ => SketchStep::Finished(Geometry::line_string(points)),
        }
    }
}
