//! GPU overlay rendering using wgpu compute shaders.
//!
//! One compute pipeline per primitive pass, all built from a single WGSL
//! module and sharing one bind group layout. The kernels mirror the CPU
//! testers exactly; only the tie-break differs, because concurrent
//! invocations write the output texture in unordered fashion.

mod buffers;
mod pipeline;
pub mod shaders;

pub use buffers::{
    GpuConic, GpuEllipse, GpuLine, GpuPoint, GpuViewport, MAX_PRIMITIVES,
};
pub use pipeline::{render_gpu, OverlayGpuError, OverlayPipelines};
