//! Loading shader sources and images from disk.
//!
//! These are the only places that touch the filesystem for GPU data. Both
//! return typed errors; the components that call them decide whether a
//! failure is fatal.

use std::path::{Path, PathBuf};

use crate::error::ResourceError;

/// Vertex and fragment shader text, plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
    /// Vertex shader path, for diagnostics. Empty for in-memory sources.
    pub vertex_path: PathBuf,
    pub fragment_path: PathBuf,
}

impl ShaderSources {
    /// Sources that did not come from files.
    pub fn inline(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
            vertex_path: PathBuf::new(),
            fragment_path: PathBuf::new(),
        }
    }
}

/// Read a vertex and a fragment shader file.
pub fn load_shader_sources(
    vertex_path: impl AsRef<Path>,
    fragment_path: impl AsRef<Path>,
) -> Result<ShaderSources, ResourceError> {
    let vertex_path = vertex_path.as_ref();
    let fragment_path = fragment_path.as_ref();
    Ok(ShaderSources {
        vertex: read_source(vertex_path)?,
        fragment: read_source(fragment_path)?,
        vertex_path: vertex_path.to_path_buf(),
        fragment_path: fragment_path.to_path_buf(),
    })
}

fn read_source(path: &Path) -> Result<String, ResourceError> {
    std::fs::read_to_string(path).map_err(|source| ResourceError::ShaderRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Decoded RGBA8 pixels, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// A `width` × `height` image filled with one color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }
}

/// Decode a PNG or JPEG file to RGBA8.
pub fn decode_image(path: impl AsRef<Path>) -> Result<ImageData, ResourceError> {
    let path = path.as_ref();
    let img = image::open(path)
        .map_err(|source| ResourceError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = img.dimensions();
    Ok(ImageData {
        width,
        height,
        pixels: img.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_both_shader_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let vs = dir.path().join("sprite.vs");
        let fs = dir.path().join("sprite.fs");
        std::fs::write(&vs, "vertex text").unwrap();
        std::fs::write(&fs, "fragment text").unwrap();

        let sources = load_shader_sources(&vs, &fs).unwrap();
        assert_eq!(sources.vertex, "vertex text");
        assert_eq!(sources.fragment, "fragment text");
        assert_eq!(sources.vertex_path, vs);
    }

    #[test]
    fn missing_shader_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let vs = dir.path().join("sprite.vs");
        std::fs::write(&vs, "vertex text").unwrap();

        let err = load_shader_sources(&vs, dir.path().join("missing.fs")).unwrap_err();
        assert!(matches!(err, ResourceError::ShaderRead { ref path, .. } if path.ends_with("missing.fs")));
    }

    #[test]
    fn decodes_png() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tile.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let img = decode_image(&path).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(&img.pixels[..4], &[10, 20, 30, 255]);
        assert_eq!(img.pixels.len(), 3 * 2 * 4);
    }

    #[test]
    fn undecodable_image() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(matches!(decode_image(&path), Err(ResourceError::ImageLoad { .. })));
    }

    #[test]
    fn solid_image_size() {
        let img = ImageData::solid(4, 2, [1, 2, 3, 4]);
        assert_eq!(img.pixels.len(), 32);
        assert_eq!(&img.pixels[28..], &[1, 2, 3, 4]);
    }
}
