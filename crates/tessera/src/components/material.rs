//! Material: a texture and a shader program drawn together.
//!
//! The batch renderer groups consecutive sprites by material *id*. Every call
//! to [`Material::new`] takes a fresh id from a process-wide counter, so two
//! materials built from the same texture and shader still break a batch.
//! Copies of one material share its id and batch together.

use std::sync::atomic::{AtomicU32, Ordering};

use super::shader::Shader;
use super::texture::Texture;
use crate::math::Vec2;
use crate::render::{GraphicsBackend, ProgramHandle, TextureHandle, Uniform};

static NEXT_MATERIAL_ID: AtomicU32 = AtomicU32::new(1);

/// Name of the sampler uniform the sprite shader reads.
pub const SAMPLER_UNIFORM: &str = "image";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    id: u32,
    texture: TextureHandle,
    texture_size: Vec2,
    program: ProgramHandle,
    unit: u32,
}

impl Material {
    /// Pair `texture` with `shader`, sampling through texture unit `unit`.
    pub fn new(texture: &Texture, shader: &Shader, unit: u32) -> Self {
        let id = NEXT_MATERIAL_ID.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "Initializing material #{id}: texture unit {unit}, texture {}x{}",
            texture.width(),
            texture.height()
        );
        Self {
            id,
            texture: texture.id(),
            texture_size: texture.size(),
            program: shader.id(),
            unit,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Pixel size of the texture, used to normalise source rects.
    pub fn texture_size(&self) -> Vec2 {
        self.texture_size
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn texture_unit(&self) -> u32 {
        self.unit
    }

    /// Activate the program and point its sampler at this material's unit.
    pub fn compile(&self, backend: &mut dyn GraphicsBackend) {
        backend.use_program(self.program);
        backend.set_uniform(self.program, SAMPLER_UNIFORM, Uniform::Int(self.unit as i32));
    }

    /// Bind the texture to this material's unit.
    pub fn bind(&self, backend: &mut dyn GraphicsBackend) {
        backend.bind_texture(self.unit, self.texture);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{ImageData, ShaderSources};
    use crate::render::{Command, Gpu, HeadlessBackend, TextureParams};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn ids_are_unique_and_increasing() {
        let gpu = Gpu::from_backend(HeadlessBackend::new());
        let texture = Texture::from_image(&gpu, &ImageData::solid(8, 8, [0; 4]), TextureParams::default());
        let shader = Shader::from_sources(&gpu, &ShaderSources::inline("v", "f")).unwrap();

        let a = Material::new(&texture, &shader, 0);
        let b = Material::new(&texture, &shader, 0);
        assert!(b.id() > a.id());
        let copy = a;
        assert_eq!(copy.id(), a.id());
        assert_eq!(a.texture_size(), Vec2::new(8.0, 8.0));
    }

    #[test]
    fn compile_and_bind_issue_backend_calls() {
        let backend = Rc::new(RefCell::new(HeadlessBackend::new()));
        let gpu = Gpu::new(backend.clone());
        let texture = Texture::from_image(&gpu, &ImageData::solid(1, 1, [0; 4]), TextureParams::default());
        let shader = Shader::from_sources(&gpu, &ShaderSources::inline("v", "f")).unwrap();
        let material = Material::new(&texture, &shader, 3);
        backend.borrow_mut().clear_commands();

        gpu.with(|b| {
            material.compile(b);
            material.bind(b);
        });

        assert_eq!(
            backend.borrow().commands(),
            &[
                Command::UseProgram(shader.id()),
                Command::SetUniform {
                    program: shader.id(),
                    name: "image".to_string(),
                    value: Uniform::Int(3),
                },
                Command::BindTexture {
                    unit: 3,
                    texture: texture.id(),
                },
            ]
        );
    }
}
