#![warn(missing_docs)]

//! GPU context management for the hudcast overlay kernel.
//!
//! Holds a process-global wgpu device and queue that the compute backend
//! dispatches overlay passes on. The embedding frame driver owns swapchain
//! and presentation concerns; this crate only hands out the device.

mod context;

pub use context::{GpuContext, GpuError};
