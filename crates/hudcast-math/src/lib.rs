#![warn(missing_docs)]

//! Math types for the hudcast overlay kernel.
//!
//! Thin wrappers around nalgebra providing domain-specific types for the
//! per-pixel overlay kernels: points, vectors, screen coordinates, and the
//! clip-space projection helper shared by every tester. Everything the
//! kernels touch is `f32`, matching the GPU-side buffer layout; the orbit
//! propagator alone works in `f64`.

use nalgebra::{Matrix4, Unit, Vector2, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f32>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f32>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f32>>;

/// A vector in 2D screen or NDC space.
pub type Vec2 = Vector2<f32>;

/// A homogeneous clip-space vector.
pub type Vec4 = Vector4<f32>;

/// A 4x4 transformation matrix.
pub type Mat4 = Matrix4<f32>;

/// A double-precision 2D vector, used by the orbit propagator.
pub type DVec2 = Vector2<f64>;

/// Projects a world-space point through a view-projection transform and
/// divides by `w`, yielding normalized device coordinates.
///
/// Only the x/y components are returned; the overlay kernels never read
/// back depth. A point on the eye plane (`w == 0`) yields non-finite
/// coordinates, which downstream threshold tests treat as a miss.
pub fn project_ndc(view_proj: &Mat4, p: Point3) -> Vec2 {
    let clip = view_proj * Vec4::new(p.x, p.y, p.z, 1.0);
    Vec2::new(clip.x / clip.w, clip.y / clip.w)
}
