//! Drawable primitive records consumed by the overlay passes.
//!
//! A primitive collection is an ordered slice of one of these types; the
//! slice index is the dispatch instance index. Collections are supplied
//! fresh each frame by the scene driver and never retained.

use hudcast_math::{Point3, Vec3};

use crate::image::Rgba;

/// A screen-space disc marker around a 3D position.
#[derive(Debug, Clone, Copy)]
pub struct Point {
    /// World-space position of the marker.
    pub position: Point3,
    /// Disc radius in output pixels.
    pub size: f32,
    /// Fill color.
    pub color: Rgba,
}

/// A 3D line segment stroked with a screen-space radius.
#[derive(Debug, Clone, Copy)]
pub struct Line {
    /// Segment start.
    pub start: Point3,
    /// Segment end.
    pub end: Point3,
    /// Stroke radius in output pixels.
    pub radius: f32,
    /// Stroke color.
    pub color: Rgba,
}

/// An ellipse given by two conjugate semi-diameters.
///
/// The axes need not be orthogonal or equal length; any parallelogram
/// basis describing the ellipse is accepted.
#[derive(Debug, Clone, Copy)]
pub struct Ellipse {
    /// Ellipse center.
    pub center: Point3,
    /// First conjugate semi-diameter.
    pub axis_1: Vec3,
    /// Second conjugate semi-diameter.
    pub axis_2: Vec3,
    /// Stroke width in output pixels.
    pub stroke_width: f32,
    /// Stroke color.
    pub color: Rgba,
}

/// A conic section in polar form about a focus.
///
/// The curve is `r(theta) = p / (1 + e * cos(theta))` in the plane spanned
/// by `u_dir` and `v_dir`, centered at `focus`. Eccentricity selects the
/// curve family: `e < 1` ellipse, `e == 1` parabola, `e > 1` hyperbola.
#[derive(Debug, Clone, Copy)]
pub struct Conic {
    /// The focus the polar form is measured from.
    pub focus: Point3,
    /// Eccentricity `e`.
    pub eccentricity: f32,
    /// Semi-latus rectum `p`, the curve's scale parameter.
    pub semi_latus_rectum: f32,
    /// Unit in-plane basis vector toward periapsis.
    pub u_dir: Vec3,
    /// Unit in-plane basis vector perpendicular to `u_dir`, oriented with
    /// increasing true anomaly.
    pub v_dir: Vec3,
    /// Stroke width in output pixels.
    pub stroke_width: f32,
    /// Stroke color.
    pub color: Rgba,
}
