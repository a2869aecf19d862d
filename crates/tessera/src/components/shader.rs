//! Shader program component.
//!
//! Owns one linked program on the backend. Loading goes through
//! [`assets::load_shader_sources`]; the program is released when the
//! `Shader` is dropped or [`release`](Shader::release)d.

use std::path::Path;

use crate::assets::{self, ShaderSources};
use crate::error::ResourceError;
use crate::logger;
use crate::math::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};
use crate::render::{Gpu, ProgramHandle, Uniform};

pub struct Shader {
    gpu: Gpu,
    program: ProgramHandle,
    released: bool,
}

impl Shader {
    /// Read, compile and link a program.
    ///
    /// # Panics
    ///
    /// Any failure (unreadable file, compile error, link error) is fatal.
    pub fn load(gpu: &Gpu, vertex_path: impl AsRef<Path>, fragment_path: impl AsRef<Path>) -> Self {
        Self::try_load(gpu, vertex_path, fragment_path).unwrap_or_else(|err| logger::fatal(err))
    }

    pub fn try_load(
        gpu: &Gpu,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ResourceError> {
        let sources = assets::load_shader_sources(vertex_path, fragment_path)?;
        Self::from_sources(gpu, &sources)
    }

    pub fn from_sources(gpu: &Gpu, sources: &ShaderSources) -> Result<Self, ResourceError> {
        let program = gpu.with(|backend| backend.compile_program(sources))?;
        log::info!(
            "Loaded shader #{} ({} + {})",
            program.raw(),
            sources.vertex_path.display(),
            sources.fragment_path.display()
        );
        Ok(Self {
            gpu: gpu.clone(),
            program,
            released: false,
        })
    }

    pub fn id(&self) -> ProgramHandle {
        self.program
    }

    /// Make this the program used by subsequent draws.
    pub fn use_program(&self) {
        self.gpu.with(|backend| backend.use_program(self.program));
    }

    pub fn set_uniform(&self, name: &str, value: Uniform) {
        self.gpu
            .with(|backend| backend.set_uniform(self.program, name, value));
    }

    pub fn set_bool(&self, name: &str, value: bool) {
        self.set_uniform(name, Uniform::Bool(value));
    }

    pub fn set_int(&self, name: &str, value: i32) {
        self.set_uniform(name, Uniform::Int(value));
    }

    pub fn set_float(&self, name: &str, value: f32) {
        self.set_uniform(name, Uniform::Float(value));
    }

    pub fn set_vec2(&self, name: &str, value: Vec2) {
        self.set_uniform(name, Uniform::Vec2(value));
    }

    pub fn set_vec3(&self, name: &str, value: Vec3) {
        self.set_uniform(name, Uniform::Vec3(value));
    }

    pub fn set_vec4(&self, name: &str, value: Vec4) {
        self.set_uniform(name, Uniform::Vec4(value));
    }

    pub fn set_mat2(&self, name: &str, value: Mat2) {
        self.set_uniform(name, Uniform::Mat2(value));
    }

    pub fn set_mat3(&self, name: &str, value: Mat3) {
        self.set_uniform(name, Uniform::Mat3(value));
    }

    pub fn set_mat4(&self, name: &str, value: Mat4) {
        self.set_uniform(name, Uniform::Mat4(value));
    }

    /// Free the program now. Later calls, and the drop, do nothing.
    pub fn release(&mut self) {
        if !std::mem::replace(&mut self.released, true) {
            self.gpu
                .with(|backend| backend.release_program(self.program));
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Shader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader")
            .field("program", &self.program)
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShaderStage;
    use crate::render::{Command, HeadlessBackend};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn headless() -> (Rc<RefCell<HeadlessBackend>>, Gpu) {
        let backend = Rc::new(RefCell::new(HeadlessBackend::new()));
        let gpu = Gpu::new(backend.clone());
        (backend, gpu)
    }

    fn write_sources(dir: &tempfile::TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
        let vs = dir.path().join("sprite.vs");
        let fs = dir.path().join("sprite.fs");
        std::fs::write(&vs, "@vertex fn vs_main() {}").unwrap();
        std::fs::write(&fs, "@fragment fn fs_main() {}").unwrap();
        (vs, fs)
    }

    #[test]
    fn load_compiles_and_drop_releases() {
        let dir = tempfile::TempDir::new().unwrap();
        let (vs, fs) = write_sources(&dir);
        let (backend, gpu) = headless();

        let shader = Shader::load(&gpu, &vs, &fs);
        assert_eq!(backend.borrow().live_resources(), 1);
        drop(shader);
        assert_eq!(backend.borrow().live_resources(), 0);
        assert_eq!(backend.borrow().invalid_releases(), 0);
    }

    #[test]
    fn explicit_release_happens_once() {
        let (backend, gpu) = headless();
        let mut shader = Shader::from_sources(&gpu, &ShaderSources::inline("v", "f")).unwrap();
        shader.release();
        shader.release();
        drop(shader);
        assert_eq!(backend.borrow().invalid_releases(), 0);
        let releases = backend
            .borrow()
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::ReleaseProgram(_)))
            .count();
        assert_eq!(releases, 1);
    }

    #[test]
    fn uniform_setters_reach_backend() {
        let (backend, gpu) = headless();
        let shader = Shader::from_sources(&gpu, &ShaderSources::inline("v", "f")).unwrap();
        shader.set_int("image", 2);
        shader.set_mat4("projection", Mat4::IDENTITY);

        let commands = backend.borrow().commands().to_vec();
        assert!(commands.contains(&Command::SetUniform {
            program: shader.id(),
            name: "image".to_string(),
            value: Uniform::Int(2),
        }));
        assert!(commands.contains(&Command::SetUniform {
            program: shader.id(),
            name: "projection".to_string(),
            value: Uniform::Mat4(Mat4::IDENTITY),
        }));
    }

    #[test]
    fn compile_error_is_typed() {
        let (backend, gpu) = headless();
        backend.borrow_mut().fail_next_compile(ShaderStage::Vertex);
        let err = Shader::from_sources(&gpu, &ShaderSources::inline("v", "f")).unwrap_err();
        assert!(err.to_string().contains("VERTEX"));
    }

    #[test]
    #[should_panic(expected = "failed to read shader file")]
    fn unreadable_file_is_fatal() {
        let (_backend, gpu) = headless();
        Shader::load(&gpu, "/no/such/sprite.vs", "/no/such/sprite.fs");
    }

    #[test]
    #[should_panic(expected = "linking error")]
    fn link_error_is_fatal() {
        let dir = tempfile::TempDir::new().unwrap();
        let (vs, fs) = write_sources(&dir);
        let (backend, gpu) = headless();
        backend.borrow_mut().fail_next_link();
        Shader::load(&gpu, &vs, &fs);
    }
}
