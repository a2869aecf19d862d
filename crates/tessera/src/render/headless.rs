//! A backend that renders nothing and remembers everything.
//!
//! [`HeadlessBackend`] records each call as a [`Command`] and tracks which
//! handles are alive. It backs the test suite and is handy for tools that run
//! the frame loop without a window (batch statistics, CI smoke runs).
//!
//! It also resolves draw state the way a real backend would: a recorded
//! [`DrawCall`] carries the program in use and the texture bound to the unit
//! that program samples (`image` uniform, unit 0 by default).

use std::collections::{HashMap, HashSet};

use super::backend::{BufferHandle, GraphicsBackend, ProgramHandle, TextureHandle, TextureParams, Uniform};
use crate::assets::{ImageData, ShaderSources};
use crate::error::{ResourceError, ShaderStage};

/// One draw as the GPU would have seen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub buffer: BufferHandle,
    pub vertices: u32,
    pub program: Option<ProgramHandle>,
    pub texture: Option<TextureHandle>,
}

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateBuffer { buffer: BufferHandle, attributes: Vec<u32> },
    ReleaseBuffer(BufferHandle),
    Upload { buffer: BufferHandle, floats: usize },
    Draw(DrawCall),
    Clear([f32; 4]),
    CompileProgram(ProgramHandle),
    UseProgram(ProgramHandle),
    SetUniform { program: ProgramHandle, name: String, value: Uniform },
    ReleaseProgram(ProgramHandle),
    CreateTexture { texture: TextureHandle, width: u32, height: u32 },
    BindTexture { unit: u32, texture: TextureHandle },
    ReleaseTexture(TextureHandle),
    Present,
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    commands: Vec<Command>,
    next_handle: u32,
    live_buffers: HashSet<BufferHandle>,
    live_programs: HashSet<ProgramHandle>,
    live_textures: HashSet<TextureHandle>,
    /// Last data uploaded per buffer.
    contents: HashMap<BufferHandle, Vec<f32>>,
    current_program: Option<ProgramHandle>,
    /// Texture unit → bound texture.
    bound: HashMap<u32, TextureHandle>,
    /// Program → unit its `image` sampler reads.
    sampler_units: HashMap<ProgramHandle, u32>,
    invalid_releases: usize,
    fail_compile: Option<ShaderStage>,
    fail_link: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `compile_program` fail in `stage`.
    pub fn fail_next_compile(&mut self, stage: ShaderStage) {
        self.fail_compile = Some(stage);
    }

    /// Make the next `compile_program` fail at link time.
    pub fn fail_next_link(&mut self) {
        self.fail_link = true;
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Forget recorded commands (handle bookkeeping is kept).
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn draw_calls(&self) -> Vec<DrawCall> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Draw(draw) => Some(*draw),
                _ => None,
            })
            .collect()
    }

    pub fn uploads(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Upload { .. }))
            .count()
    }

    pub fn clears(&self) -> Vec<[f32; 4]> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Clear(color) => Some(*color),
                _ => None,
            })
            .collect()
    }

    pub fn presents(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, Command::Present)).count()
    }

    /// Last data uploaded to `buffer`.
    pub fn contents(&self, buffer: BufferHandle) -> Option<&[f32]> {
        self.contents.get(&buffer).map(Vec::as_slice)
    }

    /// Buffers, programs and textures created and not yet released.
    pub fn live_resources(&self) -> usize {
        self.live_buffers.len() + self.live_programs.len() + self.live_textures.len()
    }

    /// Releases of handles that were never created or already released.
    pub fn invalid_releases(&self) -> usize {
        self.invalid_releases
    }

    fn next(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn note_release(&mut self, was_live: bool, what: &str, raw: u32) {
        if !was_live {
            self.invalid_releases += 1;
            log::warn!("Released {what} #{raw} which is not alive");
        }
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn create_vertex_buffer(&mut self, attributes: &[u32]) -> BufferHandle {
        let buffer = BufferHandle::from_raw(self.next());
        self.live_buffers.insert(buffer);
        self.commands.push(Command::CreateBuffer {
            buffer,
            attributes: attributes.to_vec(),
        });
        buffer
    }

    fn release_vertex_buffer(&mut self, buffer: BufferHandle) {
        let was_live = self.live_buffers.remove(&buffer);
        self.note_release(was_live, "buffer", buffer.raw());
        self.contents.remove(&buffer);
        self.commands.push(Command::ReleaseBuffer(buffer));
    }

    fn upload_vertices(&mut self, buffer: BufferHandle, data: &[f32]) {
        self.contents.insert(buffer, data.to_vec());
        self.commands.push(Command::Upload {
            buffer,
            floats: data.len(),
        });
    }

    fn draw_triangles(&mut self, buffer: BufferHandle, vertex_count: u32) {
        let program = self.current_program;
        let texture = program.and_then(|p| {
            let unit = self.sampler_units.get(&p).copied().unwrap_or(0);
            self.bound.get(&unit).copied()
        });
        self.commands.push(Command::Draw(DrawCall {
            buffer,
            vertices: vertex_count,
            program,
            texture,
        }));
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.commands.push(Command::Clear(color));
    }

    fn compile_program(&mut self, sources: &ShaderSources) -> Result<ProgramHandle, ResourceError> {
        if let Some(stage) = self.fail_compile.take() {
            return Err(ResourceError::ShaderCompile {
                stage,
                log: "headless: forced compile failure".to_string(),
            });
        }
        for (stage, text) in [
            (ShaderStage::Vertex, &sources.vertex),
            (ShaderStage::Fragment, &sources.fragment),
        ] {
            if text.trim().is_empty() {
                return Err(ResourceError::ShaderCompile {
                    stage,
                    log: "empty shader source".to_string(),
                });
            }
        }
        if std::mem::take(&mut self.fail_link) {
            return Err(ResourceError::ShaderLink {
                log: "headless: forced link failure".to_string(),
            });
        }

        let program = ProgramHandle::from_raw(self.next());
        self.live_programs.insert(program);
        self.commands.push(Command::CompileProgram(program));
        Ok(program)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.current_program = Some(program);
        self.commands.push(Command::UseProgram(program));
    }

    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: Uniform) {
        if let ("image", Uniform::Int(unit)) = (name, value) {
            self.sampler_units.insert(program, unit.max(0) as u32);
        }
        self.commands.push(Command::SetUniform {
            program,
            name: name.to_string(),
            value,
        });
    }

    fn release_program(&mut self, program: ProgramHandle) {
        let was_live = self.live_programs.remove(&program);
        self.note_release(was_live, "program", program.raw());
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        self.commands.push(Command::ReleaseProgram(program));
    }

    fn create_texture(&mut self, image: &ImageData, _params: &TextureParams) -> TextureHandle {
        let texture = TextureHandle::from_raw(self.next());
        self.live_textures.insert(texture);
        self.commands.push(Command::CreateTexture {
            texture,
            width: image.width,
            height: image.height,
        });
        texture
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        self.bound.insert(unit, texture);
        self.commands.push(Command::BindTexture { unit, texture });
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        let was_live = self.live_textures.remove(&texture);
        self.note_release(was_live, "texture", texture.raw());
        self.bound.retain(|_, bound| *bound != texture);
        self.commands.push(Command::ReleaseTexture(texture));
    }

    fn present(&mut self) {
        self.commands.push(Command::Present);
    }
}
