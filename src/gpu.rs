//! wgpu implementation of [`GraphicsContext`].
//!
//! [`GpuContext`] owns the surface, device and queue for one window, plus
//! every buffer, shader module and pipeline created through the
//! [`GraphicsContext`] trait.
//!
//! # Programs and Uniforms
//!
//! Shader stages are WGSL modules; linking a vertex module (entry point
//! `vs_main`) with a fragment module (entry point `fs_main`) creates a render
//! pipeline. Every program reads one [`MeshUniforms`] block at
//! `@group(0) @binding(0)`:
//!
//! | Uniform        | Type          |
//! |----------------|---------------|
//! | `u_model`      | `mat4x4<f32>` |
//! | `u_view`       | `mat4x4<f32>` |
//! | `u_projection` | `mat4x4<f32>` |
//! | `u_color`      | `vec4<f32>`   |
//!
//! Only names a program's modules actually declare resolve: a fragment
//! module without `u_color` gives no location for it, and a vertex module
//! without an `a_position` input gives no attribute location.
//!
//! Uniform writes update the program's copy of the block. A draw call
//! snapshots that copy, so later writes never affect earlier draws.
//!
//! # Frames
//!
//! Draws are recorded, not executed. [`GpuContext::present`] uploads all
//! recorded uniform blocks into one dynamic-offset buffer, encodes a single
//! depth-tested render pass, submits it and presents the surface.
//!
//! ```no_run
//! use std::sync::Arc;
//! use trigon::{Camera, Color, GpuContext, Scene};
//!
//! # fn frame(window: Arc<winit::window::Window>, scene: &Scene, camera: &Camera) {
//! let mut gpu = GpuContext::new(window);
//! scene.render(&mut gpu, camera).unwrap();
//! gpu.present(Color::BLACK).unwrap();
//! # }
//! ```

use std::sync::Arc;

use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::color::Color;
use crate::context::{
    BufferId, BufferKind, COLOR_UNIFORM, ContextError, GraphicsContext, MODEL_UNIFORM,
    PROJECTION_UNIFORM, ProgramId, ShaderId, ShaderStage, UniformLocation, VIEW_UNIFORM,
};
use crate::geometry::Vertex;

mod interface;

use interface::ShaderInterface;

const UNIFORM_NAMES: [&str; 4] = [MODEL_UNIFORM, VIEW_UNIFORM, PROJECTION_UNIFORM, COLOR_UNIFORM];
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const INITIAL_DRAW_CAPACITY: u64 = 64;

/// Uniform block shared by every program.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl Default for MeshUniforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            color: Color::WHITE.to_array(),
        }
    }
}

struct Shader {
    stage: ShaderStage,
    module: wgpu::ShaderModule,
    interface: ShaderInterface,
}

struct Program {
    pipeline: wgpu::RenderPipeline,
    interface: ShaderInterface,
    uniforms: MeshUniforms,
}

struct PendingDraw {
    program: ProgramId,
    vertex_buffer: BufferId,
    index_buffer: BufferId,
    index_count: u32,
    uniforms: MeshUniforms,
}

/// Core GPU context holding wgpu resources.
///
/// The surface, device, queue and surface configuration are public so wgpu
/// can be used directly when needed.
pub struct GpuContext {
    /// The surface for presenting rendered frames to the window.
    pub surface: wgpu::Surface<'static>,
    /// The logical GPU device for creating resources and pipelines.
    pub device: wgpu::Device,
    /// The command queue for submitting work to the GPU.
    pub queue: wgpu::Queue,
    /// Current surface configuration (format, size, present mode).
    pub config: wgpu::SurfaceConfiguration,
    uniform_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    uniform_stride: u64,
    uniform_capacity: u64,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
    buffers: Vec<wgpu::Buffer>,
    shaders: Vec<Shader>,
    programs: Vec<Program>,
    current_program: Option<ProgramId>,
    vertex_binding: Option<BufferId>,
    index_binding: Option<BufferId>,
    draws: Vec<PendingDraw>,
}

impl GpuContext {
    /// Create a new GPU context from a winit window.
    ///
    /// Creates the instance, surface, adapter, device and queue, configures
    /// the surface with an sRGB format, and allocates the shared uniform
    /// buffer and depth buffer.
    ///
    /// # Panics
    ///
    /// Panics if no suitable GPU adapter is found or device creation fails.
    pub fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .expect("Failed to create a surface for the window");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("Failed to find a suitable GPU adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Trigon Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))
        .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        log::info!(
            "using adapter {:?} with surface format {:?}",
            adapter.get_info().name,
            surface_format
        );

        let uniform_size = std::mem::size_of::<MeshUniforms>() as u64;
        let uniform_stride = wgpu::util::align_to(
            uniform_size,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Uniforms Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(uniform_size),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let (uniform_buffer, uniform_bind_group) = create_uniform_storage(
            &device,
            &uniform_layout,
            uniform_stride,
            INITIAL_DRAW_CAPACITY,
        );

        let depth_view = create_depth_view(&device, config.width, config.height);
        let depth_size = (config.width, config.height);

        Self {
            surface,
            device,
            queue,
            config,
            uniform_layout,
            pipeline_layout,
            uniform_stride,
            uniform_capacity: INITIAL_DRAW_CAPACITY,
            uniform_buffer,
            uniform_bind_group,
            depth_view,
            depth_size,
            buffers: Vec::new(),
            shaders: Vec::new(),
            programs: Vec::new(),
            current_program: None,
            vertex_binding: None,
            index_binding: None,
            draws: Vec::new(),
        }
    }

    /// Resize the surface to new dimensions.
    ///
    /// Ignores zero-sized dimensions (which occur while minimized).
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Returns the current surface width in pixels.
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Returns the current surface height in pixels.
    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Returns the current aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    /// Number of draws recorded since the last [`present`](Self::present).
    pub fn pending_draws(&self) -> usize {
        self.draws.len()
    }

    /// Renders all recorded draws over a `clear` background and presents.
    ///
    /// A lost or outdated surface is reconfigured and the frame is dropped.
    pub fn present(&mut self, clear: Color) -> Result<(), wgpu::SurfaceError> {
        let draws = std::mem::take(&mut self.draws);

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        self.ensure_depth_size();
        self.ensure_uniform_capacity(draws.len() as u64);
        self.upload_uniforms(&draws);

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.into()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (slot, draw) in draws.iter().enumerate() {
                if draw.index_count == 0 {
                    continue;
                }
                let (Some(program), Some(vertices), Some(indices)) = (
                    self.programs.get(draw.program.0),
                    self.buffers.get(draw.vertex_buffer.0),
                    self.buffers.get(draw.index_buffer.0),
                ) else {
                    log::warn!("skipping draw {slot} with unknown handles");
                    continue;
                };
                let offset = slot as u64 * self.uniform_stride;

                render_pass.set_pipeline(&program.pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[offset as u32]);
                render_pass.set_vertex_buffer(0, vertices.slice(..));
                render_pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn ensure_depth_size(&mut self) {
        let size = (self.config.width, self.config.height);
        if self.depth_size != size {
            self.depth_view = create_depth_view(&self.device, size.0, size.1);
            self.depth_size = size;
        }
    }

    fn ensure_uniform_capacity(&mut self, draw_count: u64) {
        if draw_count <= self.uniform_capacity {
            return;
        }
        let capacity = draw_count.next_power_of_two();
        let (buffer, bind_group) = create_uniform_storage(
            &self.device,
            &self.uniform_layout,
            self.uniform_stride,
            capacity,
        );
        log::debug!("grew uniform buffer to {capacity} draws");
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.uniform_capacity = capacity;
    }

    fn upload_uniforms(&self, draws: &[PendingDraw]) {
        if draws.is_empty() {
            return;
        }
        let stride = self.uniform_stride as usize;
        let mut staging = vec![0u8; draws.len() * stride];
        for (chunk, draw) in staging.chunks_exact_mut(stride).zip(draws) {
            let bytes = bytemuck::bytes_of(&draw.uniforms);
            chunk[..bytes.len()].copy_from_slice(bytes);
        }
        self.queue.write_buffer(&self.uniform_buffer, 0, &staging);
    }

    fn program_mut(&mut self, program: ProgramId) -> Option<&mut Program> {
        let found = self.programs.get_mut(program.0);
        if found.is_none() {
            log::warn!("uniform upload to unknown program {}", program.0);
        }
        found
    }
}

impl GraphicsContext for GpuContext {
    fn create_buffer(&mut self, kind: BufferKind, label: &str, contents: &[u8]) -> BufferId {
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            });
        self.buffers.push(buffer);
        BufferId(self.buffers.len() - 1)
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderId, ContextError> {
        let interface = ShaderInterface::parse(source).map_err(|diagnostic| {
            log::warn!("{stage} shader failed to parse");
            ContextError::ShaderCompile {
                stage,
                log: diagnostic,
            }
        })?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(match stage {
                    ShaderStage::Vertex => "Vertex Shader",
                    ShaderStage::Fragment => "Fragment Shader",
                }),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            log::warn!("{stage} shader failed to compile");
            return Err(ContextError::ShaderCompile {
                stage,
                log: err.to_string(),
            });
        }

        self.shaders.push(Shader {
            stage,
            module,
            interface,
        });
        Ok(ShaderId(self.shaders.len() - 1))
    }

    fn link_program(
        &mut self,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<ProgramId, ContextError> {
        let shader = |id: ShaderId, expected: ShaderStage| match self.shaders.get(id.0) {
            Some(shader) if shader.stage == expected => Ok(shader),
            Some(shader) => Err(ContextError::ProgramLink {
                log: format!("expected a {expected} shader, got a {} shader", shader.stage),
            }),
            None => Err(ContextError::UnknownHandle {
                kind: "shader",
                index: id.0,
            }),
        };
        let vertex_shader = shader(vertex, ShaderStage::Vertex)?;
        let fragment_shader = shader(fragment, ShaderStage::Fragment)?;
        let interface =
            ShaderInterface::link(&vertex_shader.interface, &fragment_shader.interface);

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Material Pipeline"),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex_shader.module,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment_shader.module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    front_face: wgpu::FrontFace::Ccw,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            log::warn!("program failed to link");
            return Err(ContextError::ProgramLink {
                log: err.to_string(),
            });
        }

        log::debug!("linked program with uniforms {:?}", interface.uniforms);
        self.programs.push(Program {
            pipeline,
            interface,
            uniforms: MeshUniforms::default(),
        });
        Ok(ProgramId(self.programs.len() - 1))
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        self.programs.get(program.0)?.interface.attribute(name)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        if !self.programs.get(program.0)?.interface.declares_uniform(name) {
            return None;
        }
        UNIFORM_NAMES
            .iter()
            .position(|known| *known == name)
            .map(|slot| UniformLocation::new(program, slot))
    }

    fn use_program(&mut self, program: ProgramId) {
        self.current_program = Some(program);
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferId, location: u32) {
        if location != 0 {
            log::warn!("vertex layout only has attribute location 0, got {location}");
        }
        self.vertex_binding = Some(buffer);
    }

    fn bind_index_buffer(&mut self, buffer: BufferId) {
        self.index_binding = Some(buffer);
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        let Some(program) = self.program_mut(location.program) else {
            return;
        };
        let cols = value.to_cols_array_2d();
        match location.slot {
            0 => program.uniforms.model = cols,
            1 => program.uniforms.view = cols,
            2 => program.uniforms.projection = cols,
            slot => log::warn!("uniform slot {slot} is not a mat4"),
        }
    }

    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4) {
        let Some(program) = self.program_mut(location.program) else {
            return;
        };
        match location.slot {
            3 => program.uniforms.color = value.to_array(),
            slot => log::warn!("uniform slot {slot} is not a vec4"),
        }
    }

    fn draw_indexed(&mut self, index_count: u32) -> Result<(), ContextError> {
        let program = self.current_program.ok_or(ContextError::NotBound("program"))?;
        let vertex_buffer = self
            .vertex_binding
            .ok_or(ContextError::NotBound("vertex buffer"))?;
        let index_buffer = self
            .index_binding
            .ok_or(ContextError::NotBound("index buffer"))?;
        let uniforms = self
            .programs
            .get(program.0)
            .ok_or(ContextError::UnknownHandle {
                kind: "program",
                index: program.0,
            })?
            .uniforms;

        self.draws.push(PendingDraw {
            program,
            vertex_buffer,
            index_buffer,
            index_count,
            uniforms,
        });
        Ok(())
    }
}

fn create_uniform_storage(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Mesh Uniforms"),
        size: stride * capacity,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Mesh Uniforms Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<MeshUniforms>() as u64),
            }),
        }],
    });

    (buffer, bind_group)
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
