//! Interactive vector-geometry editing engine.
//!
//! Features own a [`geometry::Geometry`]; a [`index::SegmentIndex`] keeps
//! back-references to every 2-point slice of their coordinates so that the
//! [`modify::Modifier`] can hit test, drag, insert and remove vertices with
//! pixel tolerance. [`draw::DrawingOrchestrator`] ties that engine to draw
//! tools, selection and snapping, and [`plugin::GeoEditPlugin`] exposes it to
//! a Bevy app through messages.

pub mod common;
pub mod config;
pub mod constants;
pub mod draw;
pub mod geometry;
pub mod index;
pub mod modify;
pub mod paths;
pub mod plugin;
pub mod script;
