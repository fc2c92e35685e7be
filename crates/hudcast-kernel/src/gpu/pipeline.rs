//! wgpu compute pipelines for the overlay passes.

use bytemuck::Zeroable;
use hudcast_gpu::{GpuContext, GpuError};
use thiserror::Error;
use wgpu::util::DeviceExt;

use crate::dispatch::{OverlayScene, RenderOptions};
use crate::image::OverlayImage;
use crate::viewport::Viewport;

use super::buffers::{
    GpuConic, GpuEllipse, GpuLine, GpuPoint, GpuScene, GpuViewport, MAX_PRIMITIVES,
};

/// Errors from GPU overlay rendering.
#[derive(Debug, Error)]
pub enum OverlayGpuError {
    /// A pass exceeds the dispatch depth limit.
    #[error("Pass has {count} instances, more than the {MAX_PRIMITIVES} supported")]
    TooManyPrimitives {
        /// Instance count of the offending pass.
        count: usize,
    },

    /// Underlying GPU failure.
    #[error(transparent)]
    Gpu(#[from] GpuError),
}

/// The four overlay compute pipelines, sharing one bind group layout.
pub struct OverlayPipelines {
    bind_group_layout: wgpu::BindGroupLayout,
    points: wgpu::ComputePipeline,
    lines: wgpu::ComputePipeline,
    ellipses: wgpu::ComputePipeline,
    conics: wgpu::ComputePipeline,
}

impl OverlayPipelines {
    /// Compile the overlay shader and build one pipeline per pass.
    pub fn new(ctx: &GpuContext) -> Result<Self, GpuError> {
        let shader_module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Overlay Shader"),
            source: wgpu::ShaderSource::Wgsl(super::shaders::OVERLAY_SHADER.into()),
        });

        let storage_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Overlay Bind Group Layout"),
                    entries: &[
                        // Viewport uniform
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::COMPUTE,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                        // One storage array per primitive kind
                        storage_entry(1),
                        storage_entry(2),
                        storage_entry(3),
                        storage_entry(4),
                        // Output texture
                        wgpu::BindGroupLayoutEntry {
                            binding: 5,
                            visibility: wgpu::ShaderStages::COMPUTE,
                            ty: wgpu::BindingType::StorageTexture {
                                access: wgpu::StorageTextureAccess::WriteOnly,
                                format: wgpu::TextureFormat::Rgba8Unorm,
                                view_dimension: wgpu::TextureViewDimension::D2,
                            },
                            count: None,
                        },
                    ],
                });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Overlay Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let pipeline = |label, entry_point| {
            ctx.device
                .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                    label: Some(label),
                    layout: Some(&pipeline_layout),
                    module: &shader_module,
                    entry_point: Some(entry_point),
                    compilation_options: Default::default(),
                    cache: None,
                })
        };

        Ok(Self {
            points: pipeline("Overlay Point Pipeline", "point_main"),
            lines: pipeline("Overlay Line Pipeline", "line_main"),
            ellipses: pipeline("Overlay Ellipse Pipeline", "ellipse_main"),
            conics: pipeline("Overlay Conic Pipeline", "conic_main"),
            bind_group_layout,
        })
    }

    /// Render a scene to a new image.
    ///
    /// Passes run in one command submission in draw order. Within a pass
    /// the write order between overlapping instances is whatever the GPU
    /// schedules; exactly one contender's color lands.
    pub fn render(
        &self,
        ctx: &GpuContext,
        scene: &OverlayScene,
        viewport: &Viewport,
        options: &RenderOptions,
        width: u32,
        height: u32,
    ) -> Result<OverlayImage, OverlayGpuError> {
        let gpu_scene = GpuScene::from_scene(scene);
        if gpu_scene.max_len() > MAX_PRIMITIVES {
            return Err(OverlayGpuError::TooManyPrimitives {
                count: gpu_scene.max_len(),
            });
        }
        if width == 0 || height == 0 {
            return Ok(OverlayImage::new(width, height));
        }

        let uniform = GpuViewport::new(viewport, options);
        let viewport_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Overlay Viewport Buffer"),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        // Storage buffers may not be empty; pad with one zeroed element
        // and skip the dispatch instead.
        fn storage_buffer<T: bytemuck::Pod + Zeroable>(
            ctx: &GpuContext,
            label: &str,
            items: &[T],
        ) -> wgpu::Buffer {
            let padded;
            let contents: &[T] = if items.is_empty() {
                padded = [T::zeroed()];
                &padded
            } else {
                items
            };
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(contents),
                    usage: wgpu::BufferUsages::STORAGE,
                })
        }

        let points_buffer =
            storage_buffer::<GpuPoint>(ctx, "Overlay Points Buffer", &gpu_scene.points);
        let lines_buffer =
            storage_buffer::<GpuLine>(ctx, "Overlay Lines Buffer", &gpu_scene.lines);
        let ellipses_buffer =
            storage_buffer::<GpuEllipse>(ctx, "Overlay Ellipses Buffer", &gpu_scene.ellipses);
        let conics_buffer =
            storage_buffer::<GpuConic>(ctx, "Overlay Conics Buffer", &gpu_scene.conics);

        let output_texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Overlay Output Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let output_view = output_texture.create_view(&Default::default());

        let padded_bytes_per_row = (width * 4).div_ceil(256) * 256;
        let readback_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Overlay Readback Buffer"),
            size: (padded_bytes_per_row * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: viewport_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: points_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: lines_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: ellipses_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: conics_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(&output_view),
                },
            ],
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Overlay Encoder"),
            });

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Overlay Pass"),
                timestamp_writes: None,
            });
            pass.set_bind_group(0, &bind_group, &[]);

            let mut dispatch = |pipeline: &wgpu::ComputePipeline, instances: usize| {
                if instances == 0 {
                    return;
                }
                pass.set_pipeline(pipeline);
                pass.dispatch_workgroups(
                    width.div_ceil(8),
                    height.div_ceil(8),
                    instances as u32,
                );
            };
            dispatch(&self.points, gpu_scene.points.len());
            dispatch(&self.lines, gpu_scene.lines.len());
            dispatch(&self.ellipses, gpu_scene.ellipses.len());
            dispatch(&self.conics, gpu_scene.conics.len());
        }

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &output_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &readback_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        ctx.queue.submit(Some(encoder.finish()));

        let buffer_slice = readback_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        ctx.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|_| GpuError::BufferMapping)?
            .map_err(|_| GpuError::BufferMapping)?;

        let data = buffer_slice.get_mapped_range();
        let mut image = OverlayImage::new(width, height);
        {
            let pixels = bytemuck::cast_slice_mut::<[u8; 4], u8>(image.pixels_mut());
            for row in 0..height as usize {
                let src = row * padded_bytes_per_row as usize;
                let dst = row * width as usize * 4;
                let len = width as usize * 4;
                pixels[dst..dst + len].copy_from_slice(&data[src..src + len]);
            }
        }
        drop(data);
        readback_buffer.unmap();

        Ok(image)
    }
}

/// Render a scene with the global GPU context, building the pipelines on
/// the fly. Long-lived embedders should keep an [`OverlayPipelines`]
/// around instead.
pub fn render_gpu(
    scene: &OverlayScene,
    viewport: &Viewport,
    width: u32,
    height: u32,
    options: &RenderOptions,
) -> Result<OverlayImage, OverlayGpuError> {
    let ctx = GpuContext::require()?;
    let pipelines = OverlayPipelines::new(ctx)?;
    pipelines.render(ctx, scene, viewport, options, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Rgba;
    use crate::primitives::Point;
    use hudcast_math::{Mat4, Point3, Vec3};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    #[ignore = "requires GPU"]
    fn test_gpu_point_matches_cpu() {
        let ctx = GpuContext::init_blocking().expect("GPU context");

        let viewport = Viewport {
            view_proj: Mat4::new_perspective(1.0, FRAC_PI_2, 0.1, 100.0),
            eye: Point3::origin(),
            forward: Vec3::new(0.0, 0.0, -1.0),
            xfov: FRAC_PI_2,
            up: Vec3::new(0.0, 1.0, 0.0),
            yfov: FRAC_PI_2,
        };
        let scene = OverlayScene {
            points: vec![Point {
                position: Point3::new(0.0, 0.0, -10.0),
                size: 4.0,
                color: Rgba::new(1.0, 0.0, 0.0, 1.0),
            }],
            ..Default::default()
        };

        let pipelines = OverlayPipelines::new(ctx).expect("pipelines");
        let gpu_image = pipelines
            .render(ctx, &scene, &viewport, &RenderOptions::default(), 64, 64)
            .expect("render");

        let mut cpu_image = OverlayImage::new(64, 64);
        crate::dispatch::render(&scene, &viewport, &mut cpu_image);

        let mismatches = gpu_image
            .pixels()
            .iter()
            .zip(cpu_image.pixels())
            .filter(|(g, c)| g != c)
            .count();
        // Floating point differences may flip pixels exactly on the
        // threshold; the bulk must agree.
        assert!(mismatches < 16, "{mismatches} mismatched pixels");
    }
}
