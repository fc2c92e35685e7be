//! Conic-section test (plane intersection plus Newton refinement on the
//! polar curve `r(theta) = p / (1 + e cos(theta))` about a focus).

use hudcast_math::{project_ndc, Mat4, Vec3};

use crate::image::Rgba;
use crate::primitives::Conic;

use super::{screen_distance, EyeRay};

/// Newton steps applied to the conic stationarity condition.
///
/// Empirical, not convergence-guaranteed. Conics need more steps than
/// ellipses: the radial term steepens sharply toward the asymptotes for
/// `e >= 1`, and there is no coarse band cull to discard far pixels first.
pub const CONIC_REFINE_STEPS: usize = 10;

/// One pixel's conic evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ConicSample {
    /// Whether the curve passes within the stroke width of the ray.
    pub hit: bool,
    /// Diagnostic color derived from the refined curve point's normalized
    /// screen projection, for the optional pre-threshold debug write.
    pub debug_color: Rgba,
}

/// Test whether `conic` draws on the pixel whose camera ray is `ray`,
/// using the default refinement step count.
pub fn test_conic(
    conic: &Conic,
    ray: &EyeRay,
    view_proj: &Mat4,
    width: u32,
    height: u32,
) -> ConicSample {
    test_conic_with(conic, ray, view_proj, width, height, CONIC_REFINE_STEPS)
}

/// [`test_conic`] with an explicit Newton step count.
pub fn test_conic_with(
    conic: &Conic,
    ray: &EyeRay,
    view_proj: &Mat4,
    width: u32,
    height: u32,
    refine_steps: usize,
) -> ConicSample {
    let a = ray.direction;
    let u = conic.u_dir;
    let v = conic.v_dir;
    let w = conic.focus - ray.origin;

    // Plane intersection relative to the focus; no band cull here, the
    // radial extent of a conic is unbounded for e >= 1.
    let n = u.cross(&v);
    let i = a * (w.dot(&n) / a.dot(&n)) - w;

    let i_hat = i.normalize();
    let theta0 = i_hat
        .dot(&v.normalize())
        .atan2(i_hat.dot(&u.normalize()));
    let theta = refine_theta(conic, w, a, theta0, refine_steps);

    let (sin, cos) = theta.sin_cos();
    let radius = conic.semi_latus_rectum / (1.0 + conic.eccentricity * cos);
    let curve = (u * cos + v * sin) * radius + w;
    let t = a.dot(&curve) / a.dot(&a);
    let foot = ray.at(t);
    let curve_point = ray.origin + curve;

    let ndc = project_ndc(view_proj, curve_point);
    let debug_color = Rgba::new(0.5 * ndc.x + 0.5, 0.5 * ndc.y + 0.5, 0.5, 1.0);

    let distance = screen_distance(view_proj, foot, curve_point, width, height);
    ConicSample {
        hit: t >= 0.0 && distance <= conic.stroke_width,
        debug_color,
    }
}

/// Newton refinement of the polar angle minimizing squared perpendicular
/// distance from the ray to the curve (eye-relative), using the analytic
/// first and second derivatives of `r(theta)`.
fn refine_theta(conic: &Conic, w: Vec3, a: Vec3, theta0: f32, steps: usize) -> f32 {
    let u = conic.u_dir;
    let v = conic.v_dir;
    let e = conic.eccentricity;
    let p = conic.semi_latus_rectum;
    let aa = a.dot(&a);

    let mut theta = theta0;
    for _ in 0..steps {
        let (sin, cos) = theta.sin_cos();
        let k = 1.0 + e * cos;
        let r = p / k;
        let dr = p * e * sin / (k * k);
        let ddr = p * e * (cos * k + 2.0 * e * sin * sin) / (k * k * k);

        let radial = u * cos + v * sin;
        let transverse = v * cos - u * sin;

        let pos = radial * r + w;
        let dpos = radial * dr + transverse * r;
        let ddpos = radial * (ddr - r) + transverse * (2.0 * dr);

        let g = aa * pos.dot(&dpos) - a.dot(&pos) * a.dot(&dpos);
        let dg = aa * (pos.dot(&ddpos) + dpos.dot(&dpos))
            - a.dot(&dpos) * a.dot(&dpos)
            - a.dot(&pos) * a.dot(&ddpos);
        theta -= g / dg;
    }
    theta
}

#[cfg(test)]
mod tests {
    use super::*;
    use hudcast_math::Point3;

    fn conic(e: f32, p: f32, stroke_width: f32) -> Conic {
        Conic {
            focus: Point3::new(0.0, 0.0, -5.0),
            eccentricity: e,
            semi_latus_rectum: p,
            u_dir: Vec3::new(1.0, 0.0, 0.0),
            v_dir: Vec3::new(0.0, 1.0, 0.0),
            stroke_width,
            color: Rgba::new(1.0, 1.0, 1.0, 1.0),
        }
    }

    #[test]
    fn test_circular_conic_rim_hit() {
        // e = 0 degenerates to a circle of radius p about the focus.
        let c = conic(0.0, 2.0, 1.0);
        let ray = EyeRay::new(Point3::origin(), Vec3::new(2.0, 0.0, -5.0));
        let sample = test_conic(&c, &ray, &Mat4::identity(), 64, 64);
        assert!(sample.hit);
    }

    #[test]
    fn test_circular_conic_center_miss() {
        let c = conic(0.0, 2.0, 1.0);
        let ray = EyeRay::new(Point3::origin(), Vec3::new(0.0, 0.0, -1.0));
        assert!(!test_conic(&c, &ray, &Mat4::identity(), 64, 64).hit);
    }

    #[test]
    fn test_elliptic_conic_periapsis_and_apoapsis() {
        // e = 0.5, p = 1.5: periapsis radius 1 along +u, apoapsis 3
        // along -u.
        let c = conic(0.5, 1.5, 1.0);
        let view_proj = Mat4::identity();
        let peri = EyeRay::new(Point3::origin(), Vec3::new(1.0, 0.0, -5.0));
        assert!(test_conic(&c, &peri, &view_proj, 64, 64).hit);
        let apo = EyeRay::new(Point3::origin(), Vec3::new(-3.0, 0.0, -5.0));
        assert!(test_conic(&c, &apo, &view_proj, 64, 64).hit);
        let inside = EyeRay::new(Point3::origin(), Vec3::new(0.4, 0.0, -5.0));
        assert!(!test_conic(&c, &inside, &view_proj, 64, 64).hit);
    }

    #[test]
    fn test_hyperbolic_branch_hit() {
        // e = 2: periapsis radius p / 3 along +u; the branch opens toward
        // -u and never closes.
        let c = conic(2.0, 3.0, 1.0);
        let peri = EyeRay::new(Point3::origin(), Vec3::new(1.0, 0.0, -5.0));
        assert!(test_conic(&c, &peri, &Mat4::identity(), 64, 64).hit);
    }

    #[test]
    fn test_ray_parallel_to_plane_draws_nothing() {
        let c = Conic {
            focus: Point3::new(0.0, 5.0, 0.0),
            ..conic(0.0, 2.0, 1e6)
        };
        let ray = EyeRay::new(Point3::origin(), Vec3::new(0.0, 1.0, 0.0));
        assert!(!test_conic(&c, &ray, &Mat4::identity(), 64, 64).hit);
    }

    #[test]
    fn test_debug_color_tracks_screen_projection() {
        // The rim point (2, 0, -5) projects to NDC x = 2 under identity,
        // so the diagnostic red channel saturates past 1 before clamping.
        let c = conic(0.0, 2.0, 1.0);
        let ray = EyeRay::new(Point3::origin(), Vec3::new(2.0, 0.0, -5.0));
        let sample = test_conic(&c, &ray, &Mat4::identity(), 64, 64);
        assert!((sample.debug_color.r - 1.5).abs() < 1e-3);
        assert!((sample.debug_color.g - 0.5).abs() < 1e-3);
        assert_eq!(sample.debug_color.a, 1.0);
    }
}
