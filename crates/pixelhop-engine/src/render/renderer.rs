//! wgpu renderer for the debug view.
//!
//! Draws [`DrawCommand`]s as flat-colored quads through an orthographic
//! camera that spans the virtual resolution, then letterboxes the picture
//! into the window with [`Viewport::best`]. The renderer does not own the
//! event loop; the windowed runner calls [`DebugRenderer::render`] once per
//! frame.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use super::extract::DrawCommand;
use crate::viewport::Viewport;

// ---------------------------------------------------------------------------
// Vertex
// ---------------------------------------------------------------------------

/// A single vertex with 2D position and RGBA color, sent to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck_derive::Pod, bytemuck_derive::Zeroable)]
struct Vertex {
    position: [f32; 2],
    color: [f32; 4],
}

impl Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Camera2D
// ---------------------------------------------------------------------------

/// Orthographic camera over virtual pixels, y growing downward.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera2D {
    /// Visible width in virtual pixels.
    pub width: f32,
    /// Visible height in virtual pixels.
    pub height: f32,
    /// Center of the view.
    pub x: f32,
    pub y: f32,
}

impl Camera2D {
    /// A camera showing exactly `width` x `height` pixels from the origin.
    pub fn screen(width: u32, height: u32) -> Self {
        let (width, height) = (width as f32, height as f32);
        Self {
            width,
            height,
            x: width / 2.0,
            y: height / 2.0,
        }
    }

    /// Column-major 4x4 matrix mapping the view to clip space. The top edge
    /// (smallest y) maps to `+1`.
    pub fn orthographic_matrix(&self) -> [f32; 16] {
        let left = self.x - self.width / 2.0;
        let right = self.x + self.width / 2.0;
        let top = self.y - self.height / 2.0;
        let bottom = self.y + self.height / 2.0;

        let sx = 2.0 / (right - left);
        let sy = 2.0 / (top - bottom);
        let tx = -(right + left) / (right - left);
        let ty = -(top + bottom) / (top - bottom);

        [
            sx, 0.0, 0.0, 0.0, //
            0.0, sy, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            tx, ty, 0.0, 1.0, //
        ]
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::screen(256, 240)
    }
}

const MAX_QUADS: usize = 8192;
const VERTICES_PER_QUAD: usize = 6;
const MAX_VERTICES: usize = MAX_QUADS * VERTICES_PER_QUAD;

/// Two triangles per command.
fn build_vertices(commands: &[DrawCommand]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(commands.len().min(MAX_QUADS) * VERTICES_PER_QUAD);
    for cmd in commands.iter().take(MAX_QUADS) {
        let half_w = cmd.width / 2.0;
        let half_h = cmd.height / 2.0;
        let (x, y, color) = (cmd.x, cmd.y, cmd.color);
        let corner = |dx: f32, dy: f32| Vertex {
            position: [x + dx, y + dy],
            color,
        };
        vertices.extend([
            corner(-half_w, half_h),
            corner(half_w, half_h),
            corner(half_w, -half_h),
            corner(-half_w, half_h),
            corner(half_w, -half_h),
            corner(-half_w, -half_h),
        ]);
    }
    vertices
}

// ---------------------------------------------------------------------------
// DebugRenderer
// ---------------------------------------------------------------------------

/// Alpha-blended triangle-list pipeline over [`Vertex`] buffers.
fn create_quad_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    camera_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("quad_pipeline_layout"),
        bind_group_layouts: &[camera_layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("quad_pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                // The hitbox overlay is half transparent.
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        // Triangle list, no culling.
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Flat-color quad renderer on a window surface.
pub struct DebugRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    window: Arc<winit::window::Window>,
    virtual_size: (u32, u32),
    pub camera: Camera2D,
}

impl DebugRenderer {
    /// Set up the surface, device and pipeline for `window`.
    ///
    /// # Errors
    ///
    /// Fails if no suitable GPU adapter or device is available.
    pub async fn new(
        window: Arc<winit::window::Window>,
        virtual_size: (u32, u32),
    ) -> Result<Self, anyhow::Error> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("no suitable GPU adapter found"))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("pixelhop_debug_renderer"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no supported formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("debug_renderer_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders.wgsl").into()),
        });

        let camera = Camera2D::screen(virtual_size.0, virtual_size.1);
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_uniform"),
            contents: bytemuck::cast_slice(&camera.orthographic_matrix()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("camera_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let render_pipeline =
            create_quad_pipeline(&device, &shader, &camera_bind_group_layout, config.format);

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vertex_buffer"),
            size: (MAX_VERTICES * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            vertex_buffer,
            camera_buffer,
            camera_bind_group,
            window,
            virtual_size,
            camera,
        })
    }

    /// Draw one frame and present it.
    ///
    /// # Errors
    ///
    /// Returns the [`wgpu::SurfaceError`] if the surface cannot provide a
    /// texture (window minimized, surface lost).
    pub fn render(&mut self, commands: &[DrawCommand]) -> Result<(), wgpu::SurfaceError> {
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&self.camera.orthographic_matrix()),
        );

        if commands.len() > MAX_QUADS {
            tracing::warn!(quads = commands.len(), max = MAX_QUADS, "draw list truncated");
        }
        let vertices = build_vertices(commands);
        if !vertices.is_empty() {
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let viewport = self.viewport();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("debug_renderer_encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("debug_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_viewport(
                viewport.x as f32,
                viewport.y as f32,
                viewport.width as f32,
                viewport.height as f32,
                0.0,
                1.0,
            );
            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            if !vertices.is_empty() {
                render_pass.draw(0..vertices.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Where the virtual picture lands in the window.
    pub fn viewport(&self) -> Viewport {
        Viewport::best((self.config.width, self.config.height), self.virtual_size)
    }

    /// Reconfigure the surface after a resize. Zero sizes are ignored.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn window(&self) -> &winit::window::Window {
        &self.window
    }
}
