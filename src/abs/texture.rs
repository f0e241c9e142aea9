//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct which owns a GPU texture created
//! from a decoded image file, and the [`TextureStore`] which keeps every scene
//! texture alive under its name for the lifetime of the viewer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glow::HasContext;
use indexmap::IndexMap;
use thiserror::Error;

/// Startup-fatal texture failures. Every variant names the asset path so the
/// abort message can point at the file that broke.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode texture {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("texture {path} has {channels} channels, only RGB (3) and RGBA (4) are supported")]
    UnsupportedChannels { path: PathBuf, channels: u8 },
    #[error("failed to allocate texture object for {path}: {message}")]
    Create { path: PathBuf, message: String },
}

/// Texture coordinate wrapping behaviour outside [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

impl WrapMode {
    fn to_gl(self) -> i32 {
        match self {
            WrapMode::Repeat => glow::REPEAT as i32,
            WrapMode::ClampToEdge => glow::CLAMP_TO_EDGE as i32,
        }
    }
}

/// Flips an image buffer vertically in place: row `i` swaps with row
/// `height - 1 - i`. Image files store the top row first while OpenGL samples
/// with the origin at the bottom left. Applying the flip twice restores the
/// original buffer.
pub fn flip_vertically(pixels: &mut [u8], width: u32, height: u32, channels: u32) {
    let stride = (width * channels) as usize;
    for row in 0..(height as usize / 2) {
        let top = row * stride;
        let bottom = (height as usize - 1 - row) * stride;
        for i in 0..stride {
            pixels.swap(top + i, bottom + i);
        }
    }
}

/// Represents a texture stored on the GPU side.
pub struct Texture {
    gl: Arc<glow::Context>,
    id: glow::Texture,
    width: u32,
    height: u32,
}

impl Texture {
    /// Decodes the image at `path` and uploads it as a GPU texture.
    ///
    /// Rows are flipped to OpenGL's bottom-left origin before upload. Only 3
    /// and 4 channel images are accepted. Mipmaps are generated, wrapping
    /// defaults to REPEAT on both axes and filtering to LINEAR.
    pub fn load(gl: &Arc<glow::Context>, path: &Path) -> Result<Self, TextureError> {
        let image = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let channels = image.color().channel_count();
        let (width, height) = (image.width(), image.height());
        let (format, mut pixels) = match channels {
            3 => (glow::RGB, image.into_rgb8().into_raw()),
            4 => (glow::RGBA, image.into_rgba8().into_raw()),
            _ => {
                return Err(TextureError::UnsupportedChannels {
                    path: path.to_path_buf(),
                    channels,
                });
            }
        };
        flip_vertically(&mut pixels, width, height, channels as u32);

        log::info!(
            "loaded texture {} ({}x{}, {} channels)",
            path.display(),
            width,
            height,
            channels
        );

        unsafe {
            let texture = gl.create_texture().map_err(|message| TextureError::Create {
                path: path.to_path_buf(),
                message,
            })?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            if format == glow::RGB {
                // RGB rows are not 4-byte aligned for arbitrary widths.
                gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            }
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                format as i32,
                width as i32,
                height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixels.as_slice())),
            );
            if format == glow::RGB {
                gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
            }
            gl.generate_mipmap(glow::TEXTURE_2D);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id: texture,
                width,
                height,
            })
        }
    }

    /// Overrides the wrap mode on both axes, e.g. CLAMP_TO_EDGE for surfaces
    /// whose texture must not tile past its border.
    pub fn set_wrap(&self, mode: WrapMode) {
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, mode.to_gl());
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, mode.to_gl());
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    /// Binds the texture to the specified texture unit.
    pub fn bind(&self, unit: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
        }
    }

    /// Returns the width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}

/// Ordered name -> texture table. Built once at startup, dropped once at
/// shutdown; dropping the store releases every GPU texture exactly once.
#[derive(Default)]
pub struct TextureStore {
    textures: IndexMap<String, Texture>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, texture: Texture) {
        self.textures.insert(name, texture);
    }

    pub fn get(&self, name: &str) -> Option<&Texture> {
        self.textures.get(name)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_swaps_rows() {
        // 2x3 RGB image, one byte pattern per row
        let mut pixels = vec![
            1, 1, 1, 1, 1, 1, // row 0
            2, 2, 2, 2, 2, 2, // row 1
            3, 3, 3, 3, 3, 3, // row 2
        ];
        flip_vertically(&mut pixels, 2, 3, 3);
        assert_eq!(
            pixels,
            vec![3, 3, 3, 3, 3, 3, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 1]
        );
    }

    #[test]
    fn test_flip_is_involution() {
        for (width, height, channels) in [(5, 4, 3), (3, 7, 4), (1, 1, 4), (4, 2, 3)] {
            let original: Vec<u8> = (0..width * height * channels)
                .map(|i| (i % 251) as u8)
                .collect();
            let mut pixels = original.clone();
            flip_vertically(&mut pixels, width, height, channels);
            flip_vertically(&mut pixels, width, height, channels);
            assert_eq!(pixels, original, "{}x{}x{}", width, height, channels);
        }
    }

    #[test]
    fn test_flip_single_row_is_identity() {
        let original = vec![9u8, 8, 7, 6, 5, 4, 3, 2];
        let mut pixels = original.clone();
        flip_vertically(&mut pixels, 2, 1, 4);
        assert_eq!(pixels, original);
    }
}
