//! Point marker test (screen-space disc, closed form).

use hudcast_math::Mat4;

use crate::primitives::Point;

use super::{screen_distance, EyeRay};

/// Test whether `marker` draws on the pixel whose camera ray is `ray`.
///
/// Projects the marker position and the foot of its orthogonal projection
/// onto the ray, then compares their screen separation against the marker
/// size. The disc therefore lives in screen space: its pixel radius does
/// not shrink with distance.
pub fn test_point(marker: &Point, ray: &EyeRay, view_proj: &Mat4, width: u32, height: u32) -> bool {
    let a = ray.direction;

    // Parameter of the foot of the marker position on the ray's line.
    let t0 = (a.dot(&marker.position.coords) - a.dot(&ray.origin.coords)) / a.dot(&a);
    let foot = ray.at(t0);

    let distance = screen_distance(view_proj, foot, marker.position, width, height);
    t0 >= 0.0 && distance <= marker.size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Rgba;
    use hudcast_math::{Point3, Vec3};

    fn marker(position: Point3, size: f32) -> Point {
        Point {
            position,
            size,
            color: Rgba::new(1.0, 1.0, 1.0, 1.0),
        }
    }

    #[test]
    fn test_boundary_is_inclusive() {
        // Identity projection, 8x8 image: the marker at x = 1 projects
        // exactly 4 pixels from the ray foot, with every intermediate
        // value exactly representable. The comparator must be <=.
        let ray = EyeRay::new(Point3::origin(), Vec3::new(0.0, 0.0, 1.0));
        let view_proj = Mat4::identity();
        assert!(test_point(&marker(Point3::new(1.0, 0.0, 5.0), 4.0), &ray, &view_proj, 8, 8));
        assert!(!test_point(&marker(Point3::new(1.0, 0.0, 5.0), 3.999), &ray, &view_proj, 8, 8));
    }

    #[test]
    fn test_on_ray_point_always_hits() {
        let ray = EyeRay::new(Point3::origin(), Vec3::new(0.0, 0.0, 1.0));
        assert!(test_point(
            &marker(Point3::new(0.0, 0.0, 123.0), 0.0),
            &ray,
            &Mat4::identity(),
            64,
            64
        ));
    }

    #[test]
    fn test_point_behind_eye_is_rejected() {
        // The foot parameter is negative, so even a huge radius draws
        // nothing.
        let ray = EyeRay::new(Point3::origin(), Vec3::new(0.0, 0.0, 1.0));
        assert!(!test_point(
            &marker(Point3::new(0.0, 0.0, -5.0), 1e6),
            &ray,
            &Mat4::identity(),
            64,
            64
        ));
    }

    #[test]
    fn test_unnormalized_direction_is_handled() {
        // t0 divides by a.a, so a scaled direction gives the same foot.
        let unit = EyeRay::new(Point3::origin(), Vec3::new(0.0, 0.0, 1.0));
        let scaled = EyeRay::new(Point3::origin(), Vec3::new(0.0, 0.0, 4.0));
        let m = marker(Point3::new(0.5, 0.0, 9.0), 3.0);
        let view_proj = Mat4::identity();
        assert_eq!(
            test_point(&m, &unit, &view_proj, 16, 16),
            test_point(&m, &scaled, &view_proj, 16, 16)
        );
    }

    #[test]
    fn test_non_finite_ray_draws_nothing() {
        let ray = EyeRay::new(Point3::origin(), Vec3::new(f32::NAN, f32::NAN, f32::NAN));
        assert!(!test_point(
            &marker(Point3::new(0.0, 0.0, 5.0), 1e6),
            &ray,
            &Mat4::identity(),
            64,
            64
        ));
    }
}
