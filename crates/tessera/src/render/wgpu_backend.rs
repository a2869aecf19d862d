//! # WgpuBackend: Immediate-Mode Calls on Top of wgpu
//!
//! [`GraphicsBackend`] is shaped like classic immediate-mode GL: bind a
//! program, bind a texture, upload, draw, repeat. wgpu wants the opposite:
//! build immutable pipelines and bind groups up front, record a render pass,
//! submit once. This backend bridges the two by **recording** during the frame
//! and **replaying** in `present`.
//!
//! ```text
//!  during the frame                      present()
//!  ────────────────                      ─────────
//!  clear(color)     → pending clear      one vertex buffer  ← frame arena
//!  upload_vertices  → buffer staging     one render pass
//!  draw_triangles   → copy staging into    LoadOp::Clear / Load
//!                     frame arena,         for each recorded draw:
//!                     record DrawOp          set_pipeline (cached per program+layout)
//!                       {range, program,     set_bind_group(0, program uniforms)
//!                        texture}            set_bind_group(1, texture+sampler)
//!                                            draw(0..count)
//!                                        submit
//! ```
//!
//! Copying each draw's vertices into one arena keeps the semantics of
//! "upload replaces the buffer": a later upload never rewrites vertices an
//! earlier draw already used.
//!
//! ## Programs
//!
//! A program is a vertex and a fragment WGSL module with entry points
//! `vs_main` and `fs_main`. Bind group 0 holds a `mat4x4<f32>` projection
//! uniform, bind group 1 the texture (binding 0) and sampler (binding 1).
//! Compile errors are caught with a validation error scope per module; link
//! errors (mismatched stage interfaces) surface when a pipeline is built for
//! the sprite vertex layout.
//!
//! Uniform writes go straight to the program's uniform buffer, so the value
//! in effect at `present` applies to the whole frame.
//!
//! ## Target
//!
//! The backend does not own a window. The caller passes the device, queue and
//! target format at construction and the view to render into before each
//! `present` ([`WgpuBackend::set_target`]).

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use super::backend::{
    BufferHandle, Filter, GraphicsBackend, PixelFormat, ProgramHandle, TextureHandle,
    TextureParams, Uniform, Wrap,
};
use super::vertex::SpriteVertex;
use crate::assets::{ImageData, ShaderSources};
use crate::components::SAMPLER_UNIFORM;
use crate::error::{ResourceError, ShaderStage};
use crate::math::Mat4;

/// Name of the matrix uniform backed by bind group 0.
pub const PROJECTION_UNIFORM: &str = "projection";

struct VertexBufferEntry {
    attributes: Vec<u32>,
    staging: Vec<f32>,
}

struct ProgramEntry {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    sampler_unit: u32,
}

struct TextureEntry {
    // Kept alive for the bind group.
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct DrawOp {
    /// Byte range in the frame arena.
    range: std::ops::Range<u64>,
    vertices: u32,
    attributes: Vec<u32>,
    program: ProgramHandle,
    texture: Option<TextureHandle>,
}

pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    target: Option<wgpu::TextureView>,

    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    /// 1×1 white texture used when a draw has nothing bound.
    fallback: TextureEntry,

    next_handle: u32,
    buffers: HashMap<BufferHandle, VertexBufferEntry>,
    programs: HashMap<ProgramHandle, ProgramEntry>,
    textures: HashMap<TextureHandle, TextureEntry>,
    pipelines: HashMap<(ProgramHandle, Vec<u32>), wgpu::RenderPipeline>,

    current_program: Option<ProgramHandle>,
    bound: HashMap<u32, TextureHandle>,

    clear: Option<[f32; 4]>,
    arena: Vec<f32>,
    draws: Vec<DrawOp>,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessera uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessera texture layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tessera pipeline layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let fallback = upload_texture(
            &device,
            &queue,
            &texture_layout,
            &ImageData::solid(1, 1, [255; 4]),
            &TextureParams::default(),
        );

        log::info!("wgpu backend ready ({format:?})");
        Self {
            device,
            queue,
            format,
            target: None,
            uniform_layout,
            texture_layout,
            pipeline_layout,
            fallback,
            next_handle: 0,
            buffers: HashMap::new(),
            programs: HashMap::new(),
            textures: HashMap::new(),
            pipelines: HashMap::new(),
            current_program: None,
            bound: HashMap::new(),
            clear: None,
            arena: Vec::new(),
            draws: Vec::new(),
        }
    }

    /// The view the next `present` renders into.
    pub fn set_target(&mut self, view: wgpu::TextureView) {
        self.target = Some(view);
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    fn next(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn create_module(&self, stage: ShaderStage, source: &str) -> Result<wgpu::ShaderModule, ResourceError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(match stage {
                ShaderStage::Vertex => "tessera vertex shader",
                ShaderStage::Fragment => "tessera fragment shader",
            }),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(ResourceError::ShaderCompile {
                stage,
                log: err.to_string(),
            }),
            None => Ok(module),
        }
    }

    fn build_pipeline(
        &self,
        vertex: &wgpu::ShaderModule,
        fragment: &wgpu::ShaderModule,
        attributes: &[u32],
    ) -> wgpu::RenderPipeline {
        let (vertex_attributes, stride) = vertex_attributes(attributes);
        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tessera sprite pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: vertex,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: stride,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &vertex_attributes,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: fragment,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Make sure every recorded draw has a pipeline before the pass borrows
    /// the cache.
    fn prepare_pipelines(&mut self) {
        for draw in &self.draws {
            let key = (draw.program, draw.attributes.clone());
            if self.pipelines.contains_key(&key) {
                continue;
            }
            let Some(program) = self.programs.get(&draw.program) else {
                continue;
            };
            let pipeline = self.build_pipeline(&program.vertex, &program.fragment, &draw.attributes);
            log::debug!("Built pipeline for program #{} layout {:?}", draw.program.raw(), draw.attributes);
            self.pipelines.insert(key, pipeline);
        }
    }

    fn end_frame(&mut self) {
        self.clear = None;
        self.arena.clear();
        self.draws.clear();
    }
}

impl GraphicsBackend for WgpuBackend {
    fn create_vertex_buffer(&mut self, attributes: &[u32]) -> BufferHandle {
        let buffer = BufferHandle::from_raw(self.next());
        self.buffers.insert(
            buffer,
            VertexBufferEntry {
                attributes: attributes.to_vec(),
                staging: Vec::new(),
            },
        );
        buffer
    }

    fn release_vertex_buffer(&mut self, buffer: BufferHandle) {
        if self.buffers.remove(&buffer).is_none() {
            log::warn!("Released buffer #{} which is not alive", buffer.raw());
        }
    }

    fn upload_vertices(&mut self, buffer: BufferHandle, data: &[f32]) {
        match self.buffers.get_mut(&buffer) {
            Some(entry) => {
                entry.staging.clear();
                entry.staging.extend_from_slice(data);
            }
            None => log::warn!("Upload to unknown buffer #{}", buffer.raw()),
        }
    }

    fn draw_triangles(&mut self, buffer: BufferHandle, vertex_count: u32) {
        let Some(entry) = self.buffers.get(&buffer) else {
            log::warn!("Draw from unknown buffer #{}", buffer.raw());
            return;
        };
        let Some(program) = self.current_program else {
            log::warn!("Draw with no program in use, skipped");
            return;
        };
        let stride: u32 = entry.attributes.iter().sum();
        let floats = ((vertex_count * stride) as usize).min(entry.staging.len());
        if floats == 0 {
            return;
        }

        let start = (self.arena.len() * size_of::<f32>()) as u64;
        self.arena.extend_from_slice(&entry.staging[..floats]);
        let end = (self.arena.len() * size_of::<f32>()) as u64;

        let unit = self.programs.get(&program).map_or(0, |p| p.sampler_unit);
        self.draws.push(DrawOp {
            range: start..end,
            vertices: floats as u32 / stride,
            attributes: entry.attributes.clone(),
            program,
            texture: self.bound.get(&unit).copied(),
        });
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.clear = Some(color);
    }

    fn compile_program(&mut self, sources: &ShaderSources) -> Result<ProgramHandle, ResourceError> {
        let vertex = self.create_module(ShaderStage::Vertex, &sources.vertex)?;
        let fragment = self.create_module(ShaderStage::Fragment, &sources.fragment)?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self.build_pipeline(&vertex, &fragment, &SpriteVertex::ATTRIBUTES);
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(ResourceError::ShaderLink { log: err.to_string() });
        }

        let uniform_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tessera projection uniform"),
            contents: bytemuck::cast_slice(&Mat4::IDENTITY.to_cols_array()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera uniform bind group"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let program = ProgramHandle::from_raw(self.next());
        self.pipelines
            .insert((program, SpriteVertex::ATTRIBUTES.to_vec()), pipeline);
        self.programs.insert(
            program,
            ProgramEntry {
                vertex,
                fragment,
                uniform_buffer,
                uniform_bind_group,
                sampler_unit: 0,
            },
        );
        Ok(program)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        if !self.programs.contains_key(&program) {
            log::warn!("Use of unknown program #{}", program.raw());
        }
        self.current_program = Some(program);
    }

    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: Uniform) {
        let Some(entry) = self.programs.get_mut(&program) else {
            log::warn!("Uniform `{name}` set on unknown program #{}", program.raw());
            return;
        };
        match (name, value) {
            (SAMPLER_UNIFORM, Uniform::Int(unit)) => entry.sampler_unit = unit.max(0) as u32,
            (PROJECTION_UNIFORM, Uniform::Mat4(matrix)) => {
                self.queue.write_buffer(
                    &entry.uniform_buffer,
                    0,
                    bytemuck::cast_slice(&matrix.to_cols_array()),
                );
            }
            _ => log::debug!("Uniform `{name}` has no binding in program #{}, ignored", program.raw()),
        }
    }

    fn release_program(&mut self, program: ProgramHandle) {
        if self.programs.remove(&program).is_none() {
            log::warn!("Released program #{} which is not alive", program.raw());
        }
        self.pipelines.retain(|(p, _), _| *p != program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
    }

    fn create_texture(&mut self, image: &ImageData, params: &TextureParams) -> TextureHandle {
        let entry = upload_texture(&self.device, &self.queue, &self.texture_layout, image, params);
        let texture = TextureHandle::from_raw(self.next());
        self.textures.insert(texture, entry);
        texture
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        self.bound.insert(unit, texture);
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(&texture).is_none() {
            log::warn!("Released texture #{} which is not alive", texture.raw());
        }
        self.bound.retain(|_, bound| *bound != texture);
    }

    fn present(&mut self) {
        let Some(view) = self.target.clone() else {
            log::warn!("present() with no render target, dropping {} draws", self.draws.len());
            self.end_frame();
            return;
        };
        self.prepare_pipelines();

        let vertex_buffer = (!self.arena.is_empty()).then(|| {
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("tessera frame vertices"),
                contents: bytemuck::cast_slice(&self.arena),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        let load = match self.clear {
            Some([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
            }),
            None => wgpu::LoadOp::Load,
        };

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("tessera frame encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tessera sprite pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(vertex_buffer) = &vertex_buffer {
                for draw in &self.draws {
                    let key = (draw.program, draw.attributes.clone());
                    let (Some(pipeline), Some(program)) =
                        (self.pipelines.get(&key), self.programs.get(&draw.program))
                    else {
                        continue;
                    };
                    let texture = draw
                        .texture
                        .and_then(|t| self.textures.get(&t))
                        .unwrap_or(&self.fallback);

                    pass.set_pipeline(pipeline);
                    pass.set_bind_group(0, &program.uniform_bind_group, &[]);
                    pass.set_bind_group(1, &texture.bind_group, &[]);
                    pass.set_vertex_buffer(0, vertex_buffer.slice(draw.range.clone()));
                    pass.draw(0..draw.vertices, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.end_frame();
    }
}

/// Float attributes laid out back to back, and the resulting stride in bytes.
fn vertex_attributes(components: &[u32]) -> (Vec<wgpu::VertexAttribute>, u64) {
    let mut offset = 0u64;
    let attributes = components
        .iter()
        .enumerate()
        .map(|(location, &count)| {
            let format = match count {
                1 => wgpu::VertexFormat::Float32,
                2 => wgpu::VertexFormat::Float32x2,
                3 => wgpu::VertexFormat::Float32x3,
                _ => wgpu::VertexFormat::Float32x4,
            };
            let attribute = wgpu::VertexAttribute {
                format,
                offset,
                shader_location: location as u32,
            };
            offset += format.size();
            attribute
        })
        .collect();
    (attributes, offset)
}

fn address_mode(wrap: Wrap) -> wgpu::AddressMode {
    match wrap {
        Wrap::Repeat => wgpu::AddressMode::Repeat,
        Wrap::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        Wrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    }
}

fn filter_mode(filter: Filter) -> wgpu::FilterMode {
    match filter {
        Filter::Nearest => wgpu::FilterMode::Nearest,
        Filter::Linear => wgpu::FilterMode::Linear,
    }
}

fn texture_format(format: PixelFormat) -> wgpu::TextureFormat {
    match format {
        PixelFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        PixelFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
    }
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    image: &ImageData,
    params: &TextureParams,
) -> TextureEntry {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("tessera texture"),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: texture_format(params.format),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &image.pixels,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("tessera sampler"),
        address_mode_u: address_mode(params.wrap_s),
        address_mode_v: address_mode(params.wrap_t),
        mag_filter: filter_mode(params.filter_mag),
        min_filter: filter_mode(params.filter_min),
        ..Default::default()
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("tessera texture bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });
    TextureEntry {
        _texture: texture,
        bind_group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprite_layout_is_two_float2s() {
        let (attributes, stride) = vertex_attributes(&SpriteVertex::ATTRIBUTES);
        assert_eq!(stride, (SpriteVertex::STRIDE * size_of::<f32>()) as u64);
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].format, wgpu::VertexFormat::Float32x2);
        assert_eq!(attributes[1].offset, 8);
        assert_eq!(attributes[1].shader_location, 1);
    }

    #[test]
    fn mixed_layout_offsets() {
        let (attributes, stride) = vertex_attributes(&[3, 1, 4]);
        let offsets: Vec<u64> = attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 16]);
        assert_eq!(stride, 32);
    }

    #[test]
    fn sampler_params_map_to_wgpu() {
        assert_eq!(address_mode(Wrap::MirroredRepeat), wgpu::AddressMode::MirrorRepeat);
        assert_eq!(filter_mode(Filter::Linear), wgpu::FilterMode::Linear);
        assert_eq!(
            texture_format(TextureParams::default().format),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
    }
}
