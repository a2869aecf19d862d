//! Texture component: one decoded image living on the GPU.

use std::path::Path;

use crate::assets::{self, ImageData};
use crate::error::ResourceError;
use crate::logger::{self, Severity};
use crate::math::Vec2;
use crate::render::{Gpu, TextureHandle, TextureParams};

pub struct Texture {
    gpu: Gpu,
    handle: TextureHandle,
    width: u32,
    height: u32,
    params: TextureParams,
    released: bool,
}

impl Texture {
    /// Decode an image file and upload it.
    ///
    /// A failure is logged and returned; whether it is fatal is up to the
    /// caller.
    pub fn load(gpu: &Gpu, path: impl AsRef<Path>, params: TextureParams) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let image = assets::decode_image(path).inspect_err(|_| {
            logger::error(load_failure(path), Severity::Low);
        })?;
        let texture = Self::from_image(gpu, &image, params);
        log::info!(
            "Loading Texture [{}] {}x{} at location: \"{}\"",
            texture.handle.raw(),
            texture.width,
            texture.height,
            path.display()
        );
        Ok(texture)
    }

    /// Upload already decoded pixels.
    pub fn from_image(gpu: &Gpu, image: &ImageData, params: TextureParams) -> Self {
        let handle = gpu.with(|backend| backend.create_texture(image, &params));
        Self {
            gpu: gpu.clone(),
            handle,
            width: image.width,
            height: image.height,
            params,
            released: false,
        }
    }

    pub fn id(&self) -> TextureHandle {
        self.handle
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn params(&self) -> &TextureParams {
        &self.params
    }

    /// Bind to a texture unit for subsequent draws.
    pub fn bind(&self, unit: u32) {
        self.gpu.with(|backend| backend.bind_texture(unit, self.handle));
    }

    /// Free the GPU texture now. Later calls, and the drop, do nothing.
    pub fn release(&mut self) {
        if !std::mem::replace(&mut self.released, true) {
            self.gpu.with(|backend| backend.release_texture(self.handle));
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("handle", &self.handle)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

fn load_failure(path: &Path) -> String {
    format!("Failed to load texture: {}", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Command, HeadlessBackend};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn load_png_sets_size() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("grass.png");
        image::RgbaImage::new(64, 32).save(&path).unwrap();

        let backend = Rc::new(RefCell::new(HeadlessBackend::new()));
        let gpu = Gpu::new(backend.clone());
        let texture = Texture::load(&gpu, &path, TextureParams::default()).unwrap();

        assert_eq!((texture.width(), texture.height()), (64, 32));
        assert!(backend.borrow().commands().contains(&Command::CreateTexture {
            texture: texture.id(),
            width: 64,
            height: 32,
        }));
    }

    #[test]
    fn missing_file_is_an_error() {
        let gpu = Gpu::from_backend(HeadlessBackend::new());
        let result = Texture::load(&gpu, "/no/such/grass.png", TextureParams::default());
        assert!(matches!(result, Err(ResourceError::ImageLoad { .. })));
    }

    #[test]
    fn load_failure_is_logged_as_low_error() {
        let line = logger::format_error(&load_failure(Path::new("/no/such/grass.png")), Severity::Low);
        assert_eq!(line, "ERROR: Failed to load texture: /no/such/grass.png\nSEVERITY: Low");
    }

    #[test]
    fn moved_texture_is_released_once() {
        let backend = Rc::new(RefCell::new(HeadlessBackend::new()));
        let gpu = Gpu::new(backend.clone());
        let texture = Texture::from_image(&gpu, &ImageData::solid(2, 2, [255; 4]), TextureParams::default());

        let mut holder = Vec::new();
        holder.push(texture);
        drop(holder);

        assert_eq!(backend.borrow().live_resources(), 0);
        assert_eq!(backend.borrow().invalid_releases(), 0);
    }
}
