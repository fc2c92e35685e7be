//! Line segment test (two-line closest approach, closed form).

use hudcast_math::Mat4;

use crate::primitives::Line;

use super::{screen_distance, EyeRay};

/// Test whether `line` draws on the pixel whose camera ray is `ray`.
///
/// Solves the closest-approach system between the ray's line and the
/// segment's line, clamps the segment parameter to `[0, 1]`, projects
/// both feet, and compares their screen separation against the stroke
/// radius. A ray parallel to the segment zeroes the system determinant;
/// the resulting non-finite distance fails the threshold and nothing is
/// drawn.
pub fn test_line(line: &Line, ray: &EyeRay, view_proj: &Mat4, width: u32, height: u32) -> bool {
    let r = ray.direction;
    let d = line.end - line.start;
    let s = line.start - ray.origin;

    let a = r.dot(&r);
    let b = r.dot(&d);
    let c = r.dot(&s);
    let bd = d.dot(&r); // equals b by construction
    let e = d.dot(&d);
    let f = d.dot(&s);

    let denom = a * e - bd * b;
    let t0 = (c * e - f * b) / denom;
    // The ray parameter is kept as solved; only the segment parameter is
    // clamped so overshoot tests against the nearest endpoint.
    let u0 = ((c * bd - f * a) / denom).clamp(0.0, 1.0);

    let ray_foot = ray.at(t0);
    let segment_foot = line.start + d * u0;

    let distance = screen_distance(view_proj, ray_foot, segment_foot, width, height);
    t0 >= 0.0 && distance <= line.radius
}
