//! WGSL shader sources for overlay rendering.

/// The overlay compute shader, one entry point per primitive pass.
pub const OVERLAY_SHADER: &str = include_str!("overlay.wgsl");
