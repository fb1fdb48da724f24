//! Centralized constants used across the application.
//!
//! This module contains magic numbers and configuration values that are used
//! in multiple places or would benefit from being named constants.

/// Default hit-test radius around the pointer, in pixels
pub const DEFAULT_PIXEL_TOLERANCE: f64 = 10.0;

/// Default snap radius for sketch vertices, in pixels
pub const DEFAULT_SNAP_TOLERANCE: f64 = 10.0;

/// Number of segments used when a circle is exported as a polygon
pub const DEFAULT_CIRCLE_SEGMENTS: usize = 64;

/// Lower bound on exported circle segments
pub const MIN_CIRCLE_SEGMENTS: usize = 8;

/// Upper bound on any configured pixel tolerance
pub const MAX_PIXEL_TOLERANCE: f64 = 100.0;

/// Resolution (map units per pixel) assumed by replay scripts that omit one
pub const DEFAULT_RESOLUTION: f64 = 1.0;
