//! Camera viewport record and per-pixel eye-ray generation.

use hudcast_math::{Mat4, Point3, Vec3};

/// Per-frame camera record consumed by every overlay pass.
///
/// `forward` and `up` need not be pre-orthogonalized; the ray generator
/// normalizes both and derives `right = normalize(forward x up)`. They
/// must not be parallel. Both field-of-view angles are radians, each
/// strictly between 0 and pi.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    /// View-projection transform used for screen-space distance tests.
    pub view_proj: Mat4,
    /// Eye position, the origin of every pixel ray.
    pub eye: Point3,
    /// View direction.
    pub forward: Vec3,
    /// Horizontal full field of view in radians.
    pub xfov: f32,
    /// Up direction.
    pub up: Vec3,
    /// Vertical full field of view in radians.
    pub yfov: f32,
}

impl Viewport {
    /// Build a viewport from a right-handed look-at camera and a
    /// perspective projection, deriving the ray-generator fields
    /// consistently with the transform.
    pub fn look_at(
        eye: Point3,
        target: Point3,
        up: Vec3,
        yfov: f32,
        aspect: f32,
        znear: f32,
        zfar: f32,
    ) -> Self {
        let projection = Mat4::new_perspective(aspect, yfov, znear, zfar);
        let view = Mat4::look_at_rh(&eye, &target, &up);
        let xfov = 2.0 * ((yfov / 2.0).tan() * aspect).atan();
        Self {
            view_proj: projection * view,
            eye,
            forward: target - eye,
            xfov,
            up,
            yfov,
        }
    }

    /// The camera ray direction through pixel `(px, py)` of a
    /// `width x height` image, as a unit vector.
    ///
    /// Pixel index 0 occupies position `-width / 2` exactly; no half-pixel
    /// centering offset is applied. The angular steps divide by
    /// `width - 1` / `height - 1`, so a 1-pixel-wide dimension produces a
    /// non-finite direction that downstream threshold tests silently
    /// reject.
    pub fn eye_ray(&self, px: u32, py: u32, width: u32, height: u32) -> Vec3 {
        let forward = self.forward.normalize();
        let up = self.up.normalize();
        let right = forward.cross(&up).normalize();

        let dx = 2.0 * (self.xfov / 2.0).tan() / (width as f32 - 1.0);
        let dy = 2.0 * (self.yfov / 2.0).tan() / (height as f32 - 1.0);

        let ox = px as f32 - width as f32 / 2.0;
        let oy = py as f32 - height as f32 / 2.0;

        // Pixel rows grow downward while `up` grows upward, hence the
        // subtracted vertical term.
        (forward + right * (dx * ox) - up * (dy * oy)).normalize()
    }
}
