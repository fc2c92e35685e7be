//! GPU-side mirrors of the overlay primitives and viewport.
//!
//! Layouts follow WGSL struct rules: every struct is a whole number of
//! 16-byte rows so the storage arrays stride cleanly.

use bytemuck::{Pod, Zeroable};

use crate::dispatch::{OverlayScene, RenderOptions};
use crate::primitives::{Conic, Ellipse, Line, Point};
use crate::viewport::Viewport;

/// Maximum instances per pass accepted by [`super::render_gpu`].
///
/// The z dimension of a compute dispatch is capped at 65535 by WebGPU;
/// one instance occupies one z layer.
pub const MAX_PRIMITIVES: usize = 65535;

/// Viewport uniform shared by all four kernels.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuViewport {
    /// Column-major view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Eye position; w unused.
    pub eye: [f32; 4],
    /// Forward direction in xyz, horizontal field of view in w.
    pub forward_xfov: [f32; 4],
    /// Up direction in xyz, vertical field of view in w.
    pub up_yfov: [f32; 4],
    /// x: nonzero enables the conic diagnostic write. y, z, w unused.
    pub flags: [u32; 4],
}

impl GpuViewport {
    /// Pack a viewport and render options for upload.
    pub fn new(viewport: &Viewport, options: &RenderOptions) -> Self {
        let m = &viewport.view_proj;
        let mut view_proj = [[0.0f32; 4]; 4];
        for col in 0..4 {
            for row in 0..4 {
                view_proj[col][row] = m[(row, col)];
            }
        }
        Self {
            view_proj,
            eye: [viewport.eye.x, viewport.eye.y, viewport.eye.z, 0.0],
            forward_xfov: [
                viewport.forward.x,
                viewport.forward.y,
                viewport.forward.z,
                viewport.xfov,
            ],
            up_yfov: [viewport.up.x, viewport.up.y, viewport.up.z, viewport.yfov],
            flags: [u32::from(options.conic_debug_shading), 0, 0, 0],
        }
    }
}

/// One point marker, packed to two rows.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuPoint {
    /// World position.
    pub position: [f32; 3],
    /// Screen-space radius in pixels.
    pub size: f32,
    /// Fill color.
    pub color: [f32; 4],
}

impl From<&Point> for GpuPoint {
    fn from(p: &Point) -> Self {
        Self {
            position: [p.position.x, p.position.y, p.position.z],
            size: p.size,
            color: p.color.into(),
        }
    }
}

/// One line segment, packed to three rows.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuLine {
    /// Segment start.
    pub start: [f32; 3],
    /// Stroke radius in pixels.
    pub radius: f32,
    /// Segment end.
    pub end: [f32; 3],
    /// Row padding.
    pub _pad: f32,
    /// Stroke color.
    pub color: [f32; 4],
}

impl From<&Line> for GpuLine {
    fn from(l: &Line) -> Self {
        Self {
            start: [l.start.x, l.start.y, l.start.z],
            radius: l.radius,
            end: [l.end.x, l.end.y, l.end.z],
            _pad: 0.0,
            color: l.color.into(),
        }
    }
}

/// One ellipse, packed to four rows.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuEllipse {
    /// Center position.
    pub center: [f32; 3],
    /// Stroke radius in pixels.
    pub stroke_width: f32,
    /// First semi-axis.
    pub axis_1: [f32; 3],
    /// Row padding.
    pub _pad0: f32,
    /// Second semi-axis.
    pub axis_2: [f32; 3],
    /// Row padding.
    pub _pad1: f32,
    /// Stroke color.
    pub color: [f32; 4],
}

impl From<&Ellipse> for GpuEllipse {
    fn from(e: &Ellipse) -> Self {
        Self {
            center: [e.center.x, e.center.y, e.center.z],
            stroke_width: e.stroke_width,
            axis_1: [e.axis_1.x, e.axis_1.y, e.axis_1.z],
            _pad0: 0.0,
            axis_2: [e.axis_2.x, e.axis_2.y, e.axis_2.z],
            _pad1: 0.0,
            color: e.color.into(),
        }
    }
}

/// One conic section, packed to four rows.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuConic {
    /// Focus position.
    pub focus: [f32; 3],
    /// Eccentricity.
    pub eccentricity: f32,
    /// Unit direction toward periapsis.
    pub u_dir: [f32; 3],
    /// Semi-latus rectum.
    pub semi_latus_rectum: f32,
    /// In-plane direction conjugate to `u_dir`.
    pub v_dir: [f32; 3],
    /// Stroke radius in pixels.
    pub stroke_width: f32,
    /// Stroke color.
    pub color: [f32; 4],
}

impl From<&Conic> for GpuConic {
    fn from(c: &Conic) -> Self {
        Self {
            focus: [c.focus.x, c.focus.y, c.focus.z],
            eccentricity: c.eccentricity,
            u_dir: [c.u_dir.x, c.u_dir.y, c.u_dir.z],
            semi_latus_rectum: c.semi_latus_rectum,
            v_dir: [c.v_dir.x, c.v_dir.y, c.v_dir.z],
            stroke_width: c.stroke_width,
            color: c.color.into(),
        }
    }
}

/// All four primitive arrays converted for upload.
pub(super) struct GpuScene {
    pub points: Vec<GpuPoint>,
    pub lines: Vec<GpuLine>,
    pub ellipses: Vec<GpuEllipse>,
    pub conics: Vec<GpuConic>,
}

impl GpuScene {
    pub fn from_scene(scene: &OverlayScene) -> Self {
        Self {
            points: scene.points.iter().map(GpuPoint::from).collect(),
            lines: scene.lines.iter().map(GpuLine::from).collect(),
            ellipses: scene.ellipses.iter().map(GpuEllipse::from).collect(),
            conics: scene.conics.iter().map(GpuConic::from).collect(),
        }
    }

    /// Size of the largest pass.
    pub fn max_len(&self) -> usize {
        self.points
            .len()
            .max(self.lines.len())
            .max(self.ellipses.len())
            .max(self.conics.len())
    }
}
