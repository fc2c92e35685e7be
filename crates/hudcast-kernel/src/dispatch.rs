//! Pass dispatch over the (pixel, primitive-instance) domain.
//!
//! Execution is a flat map over every (x, y, instance) triple: each unit
//! of work is pure and independent, and the only shared mutable state is
//! the output image. The CPU driver parallelizes over pixel rows and
//! walks a pass's instances in collection order within each pixel, so the
//! final successful write at a pixel is the highest-index passing
//! instance, a deterministic tie-break. The GPU backend schedules
//! invocations concurrently and keeps the unordered last-write-wins
//! outcome instead.

use rayon::prelude::*;

use crate::image::{OverlayImage, Rgba};
use crate::intersect::{
    test_ellipse_with, test_conic_with, test_line, test_point, EyeRay, CONIC_REFINE_STEPS,
    ELLIPSE_REFINE_STEPS,
};
use crate::primitives::{Conic, Ellipse, Line, Point};
use crate::viewport::Viewport;

/// All primitive collections drawn in one frame, in pass order.
#[derive(Debug, Clone, Default)]
pub struct OverlayScene {
    /// Point markers, drawn first.
    pub points: Vec<Point>,
    /// Line segments, drawn second.
    pub lines: Vec<Line>,
    /// Ellipses, drawn third.
    pub ellipses: Vec<Ellipse>,
    /// Conic sections, drawn last.
    pub conics: Vec<Conic>,
}

impl OverlayScene {
    /// True when no pass has any instance to draw.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
            && self.lines.is_empty()
            && self.ellipses.is_empty()
            && self.conics.is_empty()
    }
}

/// Tunable dispatch parameters.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Newton steps for the ellipse tester.
    pub ellipse_refine_steps: usize,
    /// Newton steps for the conic tester.
    pub conic_refine_steps: usize,
    /// Write the conic tester's diagnostic color to every evaluated pixel
    /// before thresholding. Off by default; the diagnostic floods the
    /// whole pass domain.
    pub conic_debug_shading: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            ellipse_refine_steps: ELLIPSE_REFINE_STEPS,
            conic_refine_steps: CONIC_REFINE_STEPS,
            conic_debug_shading: false,
        }
    }
}

/// Draw every collection of `scene` into `image` with default options.
///
/// Passes run in order: points, lines, ellipses, conics. A later pass
/// overwrites any earlier pass's pixels regardless of 3D depth; there is
/// no blending and no cross-type depth reconciliation.
pub fn render(scene: &OverlayScene, viewport: &Viewport, image: &mut OverlayImage) {
    render_with(scene, viewport, image, &RenderOptions::default());
}

/// [`render`] with explicit options.
pub fn render_with(
    scene: &OverlayScene,
    viewport: &Viewport,
    image: &mut OverlayImage,
    options: &RenderOptions,
) {
    point_pass(&scene.points, viewport, image);
    line_pass(&scene.lines, viewport, image);
    ellipse_pass(&scene.ellipses, viewport, image, options.ellipse_refine_steps);
    conic_pass(
        &scene.conics,
        viewport,
        image,
        options.conic_refine_steps,
        options.conic_debug_shading,
    );
}

/// Dispatch one pass over every pixel.
///
/// `shade` is the per-pixel kernel: it sees the pixel coordinate and
/// returns the color to overwrite with, if any instance passed. Rows are
/// processed in parallel; pixels within a row sequentially.
fn run_pass<F>(image: &mut OverlayImage, shade: F)
where
    F: Fn(u32, u32) -> Option<Rgba> + Sync,
{
    let width = image.width() as usize;
    if width == 0 {
        return;
    }
    image
        .pixels_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(py, row)| {
            for (px, pixel) in row.iter_mut().enumerate() {
                if let Some(color) = shade(px as u32, py as u32) {
                    *pixel = color.to_unorm8();
                }
            }
        });
}

/// Draw a point collection.
pub fn point_pass(points: &[Point], viewport: &Viewport, image: &mut OverlayImage) {
    if points.is_empty() {
        return;
    }
    let (width, height) = (image.width(), image.height());
    run_pass(image, |px, py| {
        let ray = EyeRay::new(viewport.eye, viewport.eye_ray(px, py, width, height));
        let mut color = None;
        for point in points {
            if test_point(point, &ray, &viewport.view_proj, width, height) {
                color = Some(point.color);
            }
        }
        color
    });
}

/// Draw a line collection.
pub fn line_pass(lines: &[Line], viewport: &Viewport, image: &mut OverlayImage) {
    if lines.is_empty() {
        return;
    }
    let (width, height) = (image.width(), image.height());
    run_pass(image, |px, py| {
        let ray = EyeRay::new(viewport.eye, viewport.eye_ray(px, py, width, height));
        let mut color = None;
        for line in lines {
            if test_line(line, &ray, &viewport.view_proj, width, height) {
                color = Some(line.color);
            }
        }
        color
    });
}

/// Draw an ellipse collection.
pub fn ellipse_pass(
    ellipses: &[Ellipse],
    viewport: &Viewport,
    image: &mut OverlayImage,
    refine_steps: usize,
) {
    if ellipses.is_empty() {
        return;
    }
    let (width, height) = (image.width(), image.height());
    run_pass(image, |px, py| {
        let ray = EyeRay::new(viewport.eye, viewport.eye_ray(px, py, width, height));
        let mut color = None;
        for ellipse in ellipses {
            if test_ellipse_with(ellipse, &ray, &viewport.view_proj, width, height, refine_steps) {
                color = Some(ellipse.color);
            }
        }
        color
    });
}

/// Draw a conic collection.
pub fn conic_pass(
    conics: &[Conic],
    viewport: &Viewport,
    image: &mut OverlayImage,
    refine_steps: usize,
    debug_shading: bool,
) {
    if conics.is_empty() {
        return;
    }
    let (width, height) = (image.width(), image.height());
    run_pass(image, |px, py| {
        let ray = EyeRay::new(viewport.eye, viewport.eye_ray(px, py, width, height));
        let mut color = None;
        for conic in conics {
            let sample =
                test_conic_with(conic, &ray, &viewport.view_proj, width, height, refine_steps);
            if debug_shading {
                color = Some(sample.debug_color);
            }
            if sample.hit {
                color = Some(conic.color);
            }
        }
        color
    });
}
