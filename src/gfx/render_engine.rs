use std::{iter, sync::Arc};

use log::{debug, info, warn};
use wgpu::{BindGroup, RenderPipeline, TextureFormat};

use super::{ParticleInstance, ParticleRenderer, ViewportUniform, BACKGROUND, PARTICLE_RADIUS};
use crate::error::{Result, SaverError};
use crate::simulation::{Particle, Viewport};
use crate::wgpu_utils::{self, InstanceBuffer, UniformBuffer};

/// Vertices per particle quad (two triangles)
const QUAD_VERTICES: u32 = 6;

pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,

    pipeline: RenderPipeline,
    bind_group: BindGroup,
    viewport_uniform: UniformBuffer<ViewportUniform>,
    instances: InstanceBuffer<ParticleInstance>,
    staging: Vec<ParticleInstance>,
}

impl RenderEngine {
    /// Set up the surface, device and particle pipeline
    ///
    /// `capacity` is the number of particles drawn per frame; the particle
    /// count never changes, so the instance buffer is allocated once.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        capacity: usize,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: adapter.limits().max_texture_dimension_2d,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let config = surface_config(&surface.get_capabilities(&adapter), width, height)?;
        let format = config.format;
        surface.configure(&device, &config);

        let viewport_uniform = UniformBuffer::new_with_data(
            &device,
            &ViewportUniform::new(Viewport::new(config.width, config.height), PARTICLE_RADIUS),
        );

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Viewport Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu_utils::uniform(),
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Viewport Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_uniform.binding_resource(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("particles.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[ParticleInstance::vertex_buffer_layout()],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        });

        let instances = InstanceBuffer::new(&device, capacity);
        debug!(
            "Particle pipeline ready: format={:?} size={}x{} capacity={}",
            format, config.width, config.height, capacity
        );

        Ok(RenderEngine {
            surface,
            device: device.into(),
            queue: queue.into(),
            config,
            format,
            pipeline,
            bind_group,
            viewport_uniform,
            instances,
            staging: Vec::with_capacity(capacity),
        })
    }

    fn draw(&mut self, particles: &[Particle], viewport: Viewport) -> Result<()> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Timed out acquiring the next frame, skipping it");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        self.viewport_uniform
            .update_content(&self.queue, ViewportUniform::new(viewport, PARTICLE_RADIUS));

        self.staging.clear();
        self.staging.extend(particles.iter().map(ParticleInstance::from));
        self.instances.update_data(&self.queue, &self.staging);

        let surface_texture_view =
            surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor {
                    format: Some(self.format),
                    ..Default::default()
                });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if !self.instances.is_empty() {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &self.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.instances.slice());
                render_pass.draw(0..QUAD_VERTICES, 0..self.instances.len() as u32);
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}

/// Pick the surface configuration for a window of `width` x `height`
///
/// Prefers a non-sRGB format since particle colors are already sRGB-encoded
/// bytes. Fails when the surface reports nothing it can present.
fn surface_config(
    capabilities: &wgpu::SurfaceCapabilities,
    width: u32,
    height: u32,
) -> Result<wgpu::SurfaceConfiguration> {
    let formats = &capabilities.formats;
    let format = formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first().copied())
        .ok_or(SaverError::UnsupportedSurface("texture format"))?;
    let present_mode = capabilities
        .present_modes
        .first()
        .copied()
        .ok_or(SaverError::UnsupportedSurface("present mode"))?;
    let alpha_mode = capabilities
        .alpha_modes
        .first()
        .copied()
        .ok_or(SaverError::UnsupportedSurface("alpha mode"))?;

    Ok(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: width.max(1),
        height: height.max(1),
        present_mode,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    })
}

impl ParticleRenderer for RenderEngine {
    fn render(&mut self, particles: &[Particle], viewport: Viewport) -> Result<()> {
        self.draw(particles, viewport)
    }

    fn resize(&mut self, width: u32, height: u32) {
        // Minimized windows report 0x0; keep the last valid configuration
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }
}
