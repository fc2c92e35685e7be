//! Two-body orbit propagation in the orbital plane.
//!
//! Orbits are kept in `f64`: the gravitational parameters and radii of
//! realistic systems overflow `f32` precision long before they overflow
//! range. Only the final [`Conic`] overlay primitive drops to `f32`.

use std::cmp::Ordering;

use hudcast_math::{DVec2, Point3, Vec3};

use crate::image::Rgba;
use crate::primitives::Conic;

/// A Keplerian two-body orbit, parameterized by shape and gravitational
/// parameter rather than by apsides.
#[derive(Debug, Clone, Copy)]
pub struct Orbit {
    /// Eccentricity.
    e: f64,
    /// Semi-latus rectum.
    p: f64,
    /// Gravitational parameter `G * (m1 + m2)`.
    grav: f64,
}

/// Position and velocity in the orbital plane at one instant, relative to
/// the focus. The x axis points at periapsis.
#[derive(Debug, Clone, Copy)]
pub struct OrbitalState {
    /// Position relative to the focus.
    pub position: DVec2,
    /// Velocity.
    pub velocity: DVec2,
}

impl Orbit {
    /// Create an orbit from eccentricity, semi-latus rectum, and
    /// gravitational parameter.
    pub fn new(e: f64, p: f64, grav: f64) -> Self {
        Self { e, p, grav }
    }

    /// Eccentricity.
    pub fn eccentricity(&self) -> f64 {
        self.e
    }

    /// Semi-latus rectum.
    pub fn semi_latus_rectum(&self) -> f64 {
        self.p
    }

    /// Apoapsis radius. Negative for hyperbolic orbits, which have no
    /// apoapsis.
    pub fn apoapsis(&self) -> f64 {
        self.p / (1.0 - self.e)
    }

    /// Periapsis radius.
    pub fn periapsis(&self) -> f64 {
        self.p / (1.0 + self.e)
    }

    /// Semi-major axis. Negative for hyperbolic orbits.
    pub fn semi_major_axis(&self) -> f64 {
        self.p / (1.0 - self.e.powi(2))
    }

    /// Semi-minor axis. Non-finite for parabolic and hyperbolic orbits.
    pub fn semi_minor_axis(&self) -> f64 {
        self.p / (1.0 - self.e.powi(2)).sqrt()
    }

    /// Radius at true anomaly `angle`.
    pub fn radius_at(&self, angle: f64) -> f64 {
        self.p / (1.0 + self.e * angle.cos())
    }

    /// Reciprocal of the semi-major axis. Positive for ellipses, zero for
    /// parabolas, negative for hyperbolas.
    fn alpha(&self) -> f64 {
        (1.0 - self.e.powi(2)) / self.p
    }

    /// Specific angular momentum.
    fn h(&self) -> f64 {
        (self.p * self.grav).sqrt()
    }

    /// Universal anomaly at `time` past periapsis, by Newton iteration on
    /// the universal Kepler equation.
    fn universal_anomaly(&self, time: f64) -> f64 {
        let grav = self.grav;
        let alpha = self.alpha();
        let rp = self.periapsis();

        let mut chi = grav.sqrt() * alpha.abs() * time;
        for _ in 0..100 {
            let z = alpha * chi.powi(2);
            let delta = ((1.0 - alpha * rp) * chi.powi(3) * stumpff_s(z) + rp * chi
                - grav.sqrt() * time)
                / ((1.0 - alpha * rp) * chi.powi(2) * stumpff_c(z) + rp);
            chi -= delta;
            if delta.abs() < 1e-10 {
                break;
            }
        }
        chi
    }

    /// Propagate to `time` seconds past periapsis passage using Lagrange
    /// f and g functions of the universal anomaly.
    pub fn state_at(&self, time: f64) -> OrbitalState {
        let chi = self.universal_anomaly(time);

        let grav = self.grav;
        let alpha = self.alpha();
        let rp = self.periapsis();
        let r0 = DVec2::new(rp, 0.0);
        let v0 = DVec2::new(0.0, self.h() / rp);

        let z = alpha * chi.powi(2);

        let f = 1.0 - chi.powi(2) / rp * stumpff_c(z);
        let g = time - chi.powi(3) * stumpff_s(z) / grav.sqrt();
        let position = r0 * f + v0 * g;
        let r = position.norm();

        let df = grav.sqrt() / (r * rp) * (alpha * chi.powi(3) * stumpff_s(z) - chi);
        let dg = 1.0 - chi.powi(2) / r * stumpff_c(z);
        let velocity = r0 * df + v0 * dg;

        OrbitalState { position, velocity }
    }

    /// The overlay primitive tracing this orbit, embedded in 3D by the
    /// orbital-plane basis: `u_dir` points at periapsis, `v_dir` along the
    /// velocity at periapsis. Both unit length, with the orbit's radii
    /// already in world units.
    pub fn conic(
        &self,
        focus: Point3,
        u_dir: Vec3,
        v_dir: Vec3,
        stroke_width: f32,
        color: Rgba,
    ) -> Conic {
        Conic {
            focus,
            eccentricity: self.e as f32,
            semi_latus_rectum: self.p as f32,
            u_dir,
            v_dir,
            stroke_width,
            color,
        }
    }
}

/// Stumpff function `S(z)`, continuous across the parabolic boundary.
fn stumpff_s(z: f64) -> f64 {
    let zq = z.abs().sqrt();
    match z.partial_cmp(&0.0) {
        None => f64::NAN,
        Some(Ordering::Equal) => 1.0 / 6.0,
        Some(Ordering::Greater) => (zq - zq.sin()) / zq.powi(3),
        Some(Ordering::Less) => (zq.sinh() - zq) / zq.powi(3),
    }
}

/// Stumpff function `C(z)`.
fn stumpff_c(z: f64) -> f64 {
    let zq = z.abs().sqrt();
    match z.partial_cmp(&0.0) {
        None => f64::NAN,
        Some(Ordering::Equal) => 0.5,
        Some(Ordering::Greater) => (1.0 - zq.cos()) / z,
        Some(Ordering::Less) => (zq.cosh() - 1.0) / -z,
    }
}
