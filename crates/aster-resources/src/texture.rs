//! Texture image loading.
//!
//! Decodes image files into tightly packed RGBA8 pixel data ready for upload
//! to the GPU. The Vulkan side of texture creation lives in the RHI crate.

use std::path::Path;

use tracing::info;

use crate::error::{ResourceError, ResourceResult};

/// Decoded RGBA8 image data.
#[derive(Debug, Clone)]
pub struct TextureData {
    /// Tightly packed RGBA8 pixels, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl TextureData {
    /// Loads and decodes an image file into RGBA8.
    ///
    /// Any format supported by the `image` crate's enabled decoders works;
    /// grayscale and RGB inputs are expanded to RGBA.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be decoded.
    pub fn load(path: &Path) -> ResourceResult<Self> {
        if !path.exists() {
            return Err(ResourceError::FileNotFound(path.to_path_buf()));
        }

        let image = image::open(path)?.into_rgba8();
        let (width, height) = image.dimensions();

        info!("Loaded texture: {} ({}x{})", path.display(), width, height);

        Ok(Self {
            pixels: image.into_raw(),
            width,
            height,
        })
    }

    /// Creates texture data from raw RGBA8 pixels.
    ///
    /// # Panics
    ///
    /// Panics if the pixel data size doesn't match the dimensions.
    pub fn from_rgba8(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "pixel data must be width * height * 4 bytes"
        );
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Size of the pixel data in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba8() {
        let data = TextureData::from_rgba8(vec![255; 2 * 2 * 4], 2, 2);
        assert_eq!(data.width, 2);
        assert_eq!(data.height, 2);
        assert_eq!(data.byte_size(), 16);
    }

    #[test]
    #[should_panic(expected = "pixel data must be")]
    fn test_from_rgba8_size_mismatch_panics() {
        TextureData::from_rgba8(vec![0; 3], 2, 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = TextureData::load(Path::new("does/not/exist.png"));
        assert!(matches!(result, Err(ResourceError::FileNotFound(_))));
    }
}
