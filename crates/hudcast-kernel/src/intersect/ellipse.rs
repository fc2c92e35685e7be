//! Ellipse test (plane intersection plus bounded Newton refinement on a
//! conjugate-diameter parametric curve).

use hudcast_math::{Mat4, Vec3};

use crate::primitives::Ellipse;

use super::{screen_distance, EyeRay};

/// Newton steps applied to the ellipse stationarity condition.
///
/// The count is empirical, not convergence-guaranteed; the initial guess
/// from the plane intersection is close enough that two steps suffice at
/// stroke-width resolution.
pub const ELLIPSE_REFINE_STEPS: usize = 2;

/// Lower edge of the radial band accepted by the coarse cull.
const RADIAL_BAND_MIN: f32 = 0.75;
/// Upper edge of the radial band accepted by the coarse cull.
const RADIAL_BAND_MAX: f32 = 1.25;

/// Test whether `ellipse` draws on the pixel whose camera ray is `ray`,
/// using the default refinement step count.
pub fn test_ellipse(
    ellipse: &Ellipse,
    ray: &EyeRay,
    view_proj: &Mat4,
    width: u32,
    height: u32,
) -> bool {
    test_ellipse_with(ellipse, ray, view_proj, width, height, ELLIPSE_REFINE_STEPS)
}

/// [`test_ellipse`] with an explicit Newton step count.
pub fn test_ellipse_with(
    ellipse: &Ellipse,
    ray: &EyeRay,
    view_proj: &Mat4,
    width: u32,
    height: u32,
    refine_steps: usize,
) -> bool {
    let a = ray.direction;
    let u = ellipse.axis_1;
    let v = ellipse.axis_2;
    let w = ellipse.center - ray.origin;

    // Coarse reject: center behind the eye plane.
    if w.dot(&a) < 0.0 {
        return false;
    }

    // Intersection of the ray with the ellipse plane, relative to the
    // center.
    let n = u.cross(&v);
    let i = a * (w.dot(&n) / a.dot(&n)) - w;

    // Cheap band reject in normalized radial coordinates. Assumes the
    // stroke width is well under a quarter of the radius; pixels whose
    // plane hit lands far from the rim cannot pass the threshold anyway.
    // Non-finite radii (ray parallel to the plane) fail the range check
    // and draw nothing.
    let up = i.dot(&u) / u.dot(&u);
    let vp = i.dot(&v) / v.dot(&v);
    let radial = (up * up + vp * vp).sqrt();
    if !(RADIAL_BAND_MIN..=RADIAL_BAND_MAX).contains(&radial) {
        return false;
    }

    let i_hat = i.normalize();
    let theta0 = i_hat
        .dot(&v.normalize())
        .atan2(i_hat.dot(&u.normalize()));
    let theta = refine_theta(u, v, w, a, theta0, refine_steps);

    // Curve point relative to the eye, and the ray foot at the same
    // parametric depth.
    let curve = u * theta.cos() + v * theta.sin() + w;
    let t = a.dot(&curve) / a.dot(&a);
    let foot = ray.at(t);
    let curve_point = ray.origin + curve;

    let distance = screen_distance(view_proj, foot, curve_point, width, height);
    t >= 0.0 && distance <= ellipse.stroke_width
}

/// Newton refinement of the parametric angle minimizing squared
/// perpendicular distance from the ray to the curve
/// `e(theta) = u cos(theta) + v sin(theta) + w` (eye-relative).
///
/// Runs a fixed number of steps with no convergence or divergence guard;
/// a vanishing `g'` propagates non-finite values that the caller's
/// threshold test rejects.
fn refine_theta(u: Vec3, v: Vec3, w: Vec3, a: Vec3, theta0: f32, steps: usize) -> f32 {
    let aa = a.dot(&a);
    let mut theta = theta0;
    for _ in 0..steps {
        let (sin, cos) = theta.sin_cos();
        let e = u * cos + v * sin + w;
        let de = v * cos - u * sin;
        let dde = -(u * cos + v * sin);

        // Stationarity of squared perpendicular ray distance.
        let g = aa * e.dot(&de) - a.dot(&e) * a.dot(&de);
        let dg = aa * (e.dot(&dde) + de.dot(&de))
            - a.dot(&de) * a.dot(&de)
            - a.dot(&e) * a.dot(&dde);
        theta -= g / dg;
    }
    theta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Rgba;
    use hudcast_math::Point3;

    fn circle(center: Point3, radius: f32, stroke_width: f32) -> Ellipse {
        Ellipse {
            center,
            axis_1: Vec3::new(radius, 0.0, 0.0),
            axis_2: Vec3::new(0.0, radius, 0.0),
            stroke_width,
            color: Rgba::new(1.0, 1.0, 1.0, 1.0),
        }
    }

    /// Independent reference: densely scan the curve parameter in f64 for
    /// the point minimizing squared perpendicular distance to the ray
    /// line, then polish with a ternary search.
    fn reference_theta(u: [f64; 3], v: [f64; 3], w: [f64; 3], a: [f64; 3]) -> f64 {
        let dist2 = |theta: f64| {
            let (s, c) = theta.sin_cos();
            let p = [
                u[0] * c + v[0] * s + w[0],
                u[1] * c + v[1] * s + w[1],
                u[2] * c + v[2] * s + w[2],
            ];
            let aa = a[0] * a[0] + a[1] * a[1] + a[2] * a[2];
            let pp = p[0] * p[0] + p[1] * p[1] + p[2] * p[2];
            let ap = a[0] * p[0] + a[1] * p[1] + a[2] * p[2];
            pp - ap * ap / aa
        };

        let samples = 1_000_000;
        let mut best = 0.0f64;
        let mut best_d = f64::INFINITY;
        for k in 0..samples {
            let theta = -std::f64::consts::PI
                + 2.0 * std::f64::consts::PI * k as f64 / samples as f64;
            let d = dist2(theta);
            if d < best_d {
                best_d = d;
                best = theta;
            }
        }

        let step = 2.0 * std::f64::consts::PI / samples as f64;
        let (mut lo, mut hi) = (best - step, best + step);
        for _ in 0..200 {
            let m1 = lo + (hi - lo) / 3.0;
            let m2 = hi - (hi - lo) / 3.0;
            if dist2(m1) < dist2(m2) {
                hi = m2;
            } else {
                lo = m1;
            }
        }
        (lo + hi) / 2.0
    }

    #[test]
    fn test_two_steps_match_analytic_nearest_point() {
        // Circle of radius 2 in the z = -5 plane, center nudged off axis,
        // oblique ray through a pixel near the rim. Two Newton steps from
        // the plane-intersection guess must land within 1e-4 of the
        // scanned optimum.
        let u = Vec3::new(2.0, 0.0, 0.0);
        let v = Vec3::new(0.0, 2.0, 0.0);
        let w = Vec3::new(0.3, -0.2, -5.0);
        let a = Vec3::new(0.35, 0.22, -1.0);

        // Plane-intersection initial guess, as the tester computes it.
        let n = u.cross(&v);
        let i = a * (w.dot(&n) / a.dot(&n)) - w;
        let i_hat = i.normalize();
        let theta0 = i_hat.dot(&v.normalize()).atan2(i_hat.dot(&u.normalize()));

        let refined = refine_theta(u, v, w, a, theta0, ELLIPSE_REFINE_STEPS) as f64;
        let expected = reference_theta(
            [2.0, 0.0, 0.0],
            [0.0, 2.0, 0.0],
            [0.3, -0.2, -5.0],
            [0.35, 0.22, -1.0],
        );

        let wrapped = (refined - expected + std::f64::consts::PI)
            .rem_euclid(2.0 * std::f64::consts::PI)
            - std::f64::consts::PI;
        assert!(
            wrapped.abs() < 1e-4,
            "refined {refined} vs reference {expected}"
        );
    }

    #[test]
    fn test_rim_ray_hits_circle() {
        // Ray aimed at the rim point (2, 0, -5).
        let ellipse = circle(Point3::new(0.0, 0.0, -5.0), 2.0, 1.0);
        let ray = EyeRay::new(Point3::origin(), Vec3::new(2.0, 0.0, -5.0));
        assert!(test_ellipse(&ellipse, &ray, &Mat4::identity(), 64, 64));
    }

    #[test]
    fn test_center_ray_is_band_culled() {
        // The plane hit lands at the center: normalized radius 0, far
        // outside [0.75, 1.25].
        let ellipse = circle(Point3::new(0.0, 0.0, -5.0), 2.0, 1e6);
        let ray = EyeRay::new(Point3::origin(), Vec3::new(0.0, 0.0, -1.0));
        assert!(!test_ellipse(&ellipse, &ray, &Mat4::identity(), 64, 64));
    }

    #[test]
    fn test_center_behind_eye_is_culled() {
        let ellipse = circle(Point3::new(0.0, 0.0, 5.0), 2.0, 1e6);
        let ray = EyeRay::new(Point3::origin(), Vec3::new(0.0, 0.0, -1.0));
        assert!(!test_ellipse(&ellipse, &ray, &Mat4::identity(), 64, 64));
    }

    #[test]
    fn test_ray_parallel_to_plane_draws_nothing() {
        // a.n == 0: the plane intersection is non-finite and the band
        // check rejects it without panicking.
        let ellipse = circle(Point3::new(0.0, 5.0, 0.0), 2.0, 1e6);
        let ray = EyeRay::new(Point3::origin(), Vec3::new(0.0, 1.0, 0.0));
        assert!(!test_ellipse(&ellipse, &ray, &Mat4::identity(), 64, 64));
    }

    #[test]
    fn test_conjugate_axes_accepted() {
        // Sheared basis describing the same circle region: still draws
        // near the rim.
        let ellipse = Ellipse {
            center: Point3::new(0.0, 0.0, -5.0),
            axis_1: Vec3::new(2.0, 0.0, 0.0),
            axis_2: Vec3::new(1.0, 2.0, 0.0),
            stroke_width: 2.0,
            color: Rgba::new(1.0, 1.0, 1.0, 1.0),
        };
        let ray = EyeRay::new(Point3::origin(), Vec3::new(2.0, 0.0, -5.0));
        assert!(test_ellipse(&ellipse, &ray, &Mat4::identity(), 64, 64));
    }
}
