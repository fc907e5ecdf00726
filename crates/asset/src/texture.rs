//! Texture loading and data structures.

use std::path::Path;

use crate::bmp::BmpHeader;
use crate::error::{AssetError, AssetResult};

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

/// Supported texture formats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureFormat {
    Rgba8,
}

impl TextureData {
    /// Create a new texture with given dimensions and RGBA8 format.
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(
            data.len(),
            (width * height * 4) as usize,
            "Data size doesn't match RGBA8 format"
        );
        Self {
            data,
            width,
            height,
            format: TextureFormat::Rgba8,
        }
    }

    /// Load a texture from a BMP file.
    pub fn load_bmp<P: AsRef<Path>>(path: P) -> AssetResult<Self> {
        let path = path.as_ref();
        log::info!("Loading texture from {:?}", path);

        let bytes = std::fs::read(path).map_err(|e| AssetError::io(path, e))?;
        let texture = Self::from_bmp_bytes(&bytes, &path.display().to_string())?;

        log::info!(
            "Loaded texture {}x{} with {} bytes",
            texture.width,
            texture.height,
            texture.data.len()
        );
        Ok(texture)
    }

    /// Decode an in-memory BMP. The header is checked before any pixel is touched.
    pub fn from_bmp_bytes(bytes: &[u8], label: &str) -> AssetResult<Self> {
        let header = BmpHeader::parse(bytes, label)?;

        let range = header.pixel_range();
        if range.end > bytes.len() {
            return Err(AssetError::format(
                label,
                format!(
                    "pixel data {}..{} runs past end of file ({} bytes)",
                    range.start,
                    range.end,
                    bytes.len()
                ),
            ));
        }

        let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Bmp).map_err(
            |source| AssetError::Image {
                label: label.to_string(),
                source,
            },
        )?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if (width, height) != (header.width, header.height) {
            return Err(AssetError::format(
                label,
                format!(
                    "decoded size {width}x{height} disagrees with header {}x{}",
                    header.width, header.height
                ),
            ));
        }

        Ok(Self::new_rgba8(width, height, rgba.into_raw()))
    }

    /// Create a simple test texture (checkerboard pattern).
    pub fn create_test_texture(size: u32) -> Self {
        let mut data = Vec::with_capacity((size * size * 4) as usize);

        for y in 0..size {
            for x in 0..size {
                let checker = ((x / 8) + (y / 8)) % 2;
                if checker == 0 {
                    data.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    data.extend_from_slice(&[128, 128, 128, 255]);
                }
            }
        }

        Self::new_rgba8(size, size, data)
    }

    /// Get the number of bytes per pixel for the format.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self.format {
            TextureFormat::Rgba8 => 4,
        }
    }

    /// Check if the texture data is valid.
    pub fn is_valid(&self) -> bool {
        let expected_size = (self.width * self.height * self.bytes_per_pixel()) as usize;
        self.data.len() == expected_size && self.width > 0 && self.height > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmp::encode_bgr24;

    #[test]
    fn decoded_size_matches_dimensions() {
        let bytes = encode_bgr24(5, 3, [10, 20, 30]);
        let tex = TextureData::from_bmp_bytes(&bytes, "small.bmp").expect("decode");
        assert_eq!((tex.width, tex.height), (5, 3));
        assert_eq!(
            tex.data.len(),
            (tex.width * tex.height * tex.bytes_per_pixel()) as usize
        );
        assert!(tex.is_valid());
        // BGR on disk -> RGBA in memory
        assert_eq!(&tex.data[..4], &[30, 20, 10, 255]);
    }

    #[test]
    fn wrong_magic_fails_without_decoding() {
        let mut bytes = encode_bgr24(2, 2, [0; 3]);
        bytes[0] = b'X';
        let err = TextureData::from_bmp_bytes(&bytes, "bad.bmp").unwrap_err();
        assert!(matches!(err, AssetError::Format { .. }), "{err}");
    }

    #[test]
    fn truncated_pixels_are_rejected() {
        let bytes = encode_bgr24(4, 4, [0; 3]);
        let err = TextureData::from_bmp_bytes(&bytes[..60], "cut.bmp").unwrap_err();
        assert!(err.to_string().contains("past end"), "{err}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = TextureData::load_bmp("graphics/nope.bmp").unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn checkerboard_is_valid() {
        let tex = TextureData::create_test_texture(16);
        assert!(tex.is_valid());
        assert_eq!(&tex.data[..4], &[255, 255, 255, 255]);
        assert_eq!(&tex.data[8 * 4..8 * 4 + 4], &[128, 128, 128, 255]);
    }
}
