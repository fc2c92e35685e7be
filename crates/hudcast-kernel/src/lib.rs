#![warn(missing_docs)]

//! Per-pixel HUD overlay kernels.
//!
//! Draws exact, resolution-independent geometric markers - points, line
//! segments, ellipses, and conic-section arcs - by evaluating a ray test
//! at every output pixel instead of rasterizing tessellated geometry.
//! Every (pixel, instance) unit of work is a pure function of the frame's
//! inputs; the kernel holds no state between dispatches.
//!
//! # Architecture
//!
//! - [`Viewport`] - camera record and per-pixel eye-ray generation
//! - [`primitives`] - the four drawable primitive records
//! - [`intersect`] - per-pixel ray testers, one per primitive kind
//! - [`dispatch`] - CPU-parallel pass driver over the (x, y, instance) domain
//! - [`orbit`] - Kepler propagation and conic-marker construction
//! - [`gpu`] - wgpu compute backend running the same kernels (feature `gpu`)
//!
//! # Example
//!
//! ```
//! use hudcast_kernel::{render, OverlayImage, OverlayScene, Rgba, Viewport};
//! use hudcast_math::{Point3, Vec3};
//!
//! let viewport = Viewport::look_at(
//!     Point3::new(0.0, 0.0, 5.0),
//!     Point3::origin(),
//!     Vec3::y(),
//!     60f32.to_radians(),
//!     1.0,
//!     0.1,
//!     1000.0,
//! );
//! let mut scene = OverlayScene::default();
//! scene.points.push(hudcast_kernel::primitives::Point {
//!     position: Point3::origin(),
//!     size: 4.0,
//!     color: Rgba::new(1.0, 1.0, 0.0, 1.0),
//! });
//! let mut image = OverlayImage::new(256, 256);
//! render(&scene, &viewport, &mut image);
//! ```

pub mod dispatch;
pub mod image;
pub mod intersect;
pub mod orbit;
pub mod primitives;
pub mod viewport;

#[cfg(feature = "gpu")]
pub mod gpu;

pub use dispatch::{render, render_with, OverlayScene, RenderOptions};
pub use image::{OverlayImage, Rgba};
pub use orbit::{Orbit, OrbitalState};
pub use viewport::Viewport;
