//! Per-pixel ray/primitive testers.
//!
//! Each primitive kind has a dedicated tester that decides whether the
//! primitive passes within its stroke width of the camera ray through one
//! pixel. All testers share the same screen-space distance measure: the
//! closest points on ray and primitive are both projected through the
//! view-projection transform and compared in pixels. Degenerate inputs
//! (parallel ray/plane, zero denominators) propagate as non-finite floats
//! and fail the final threshold comparison, drawing nothing.

mod conic;
mod ellipse;
mod line;
mod point;

pub use conic::{test_conic, test_conic_with, ConicSample, CONIC_REFINE_STEPS};
pub use ellipse::{test_ellipse, test_ellipse_with, ELLIPSE_REFINE_STEPS};
pub use line::test_line;
pub use point::test_point;

use hudcast_math::{project_ndc, Mat4, Point3, Vec2, Vec3};

/// The camera ray through one output pixel.
///
/// The direction is unit length for well-formed viewports but may carry
/// non-finite components for degenerate image dimensions; testers never
/// assume finiteness.
#[derive(Debug, Clone, Copy)]
pub struct EyeRay {
    /// Ray origin (the viewport eye).
    pub origin: Point3,
    /// Ray direction.
    pub direction: Vec3,
}

impl EyeRay {
    /// Create a ray from origin and direction.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Evaluate the ray at parameter `t`.
    #[inline]
    pub fn at(&self, t: f32) -> Point3 {
        self.origin + self.direction * t
    }
}

/// Distance in output pixels between the screen projections of two world
/// points.
///
/// This measures the separation of two projected 3D points rather than
/// the true 2D distance from the pixel center to a projected curve; the
/// testers rely on that exact approximation.
pub(crate) fn screen_distance(
    view_proj: &Mat4,
    a: Point3,
    b: Point3,
    width: u32,
    height: u32,
) -> f32 {
    let delta = project_ndc(view_proj, a) - project_ndc(view_proj, b);
    Vec2::new(
        delta.x * width as f32 / 2.0,
        delta.y * height as f32 / 2.0,
    )
    .norm()
}
