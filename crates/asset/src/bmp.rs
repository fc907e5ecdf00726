//! BMP header inspection.
//!
//! Only the fields the viewer cares about are read; pixel decoding is left to
//! the `image` codec once the header has been accepted.

use crate::error::{AssetError, AssetResult};

/// File header (14 bytes) + BITMAPINFOHEADER (40 bytes).
pub const HEADER_LEN: usize = 54;
pub const MAGIC: [u8; 2] = *b"BM";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BmpHeader {
    /// Byte offset of the first pixel row.
    pub pixel_data_offset: u32,
    pub width: u32,
    pub height: u32,
    /// Rows are stored top-down when the on-disk height is negative.
    pub top_down: bool,
    pub bits_per_pixel: u16,
    /// Size of the pixel array in bytes, including row padding.
    pub image_size: u32,
}

impl BmpHeader {
    /// Parse and sanity-check the fixed-size header at the start of `bytes`.
    pub fn parse(bytes: &[u8], label: &str) -> AssetResult<Self> {
        if bytes.len() < 2 || bytes[..2] != MAGIC {
            return Err(AssetError::format(label, "not a BMP file (bad magic bytes)"));
        }
        if bytes.len() < HEADER_LEN {
            return Err(AssetError::format(
                label,
                format!("truncated header: {} of {} bytes", bytes.len(), HEADER_LEN),
            ));
        }

        let mut pixel_data_offset = read_u32(bytes, 10);
        let raw_width = read_i32(bytes, 18);
        let raw_height = read_i32(bytes, 22);
        let bits_per_pixel = read_u16(bytes, 28);
        let mut image_size = read_u32(bytes, 34);

        if raw_width <= 0 || raw_height == 0 {
            return Err(AssetError::format(
                label,
                format!("invalid dimensions {raw_width}x{raw_height}"),
            ));
        }
        if !matches!(bits_per_pixel, 1 | 4 | 8 | 16 | 24 | 32) {
            return Err(AssetError::format(
                label,
                format!("unsupported bit depth {bits_per_pixel}"),
            ));
        }

        let width = raw_width.unsigned_abs();
        let height = raw_height.unsigned_abs();

        if pixel_data_offset == 0 {
            pixel_data_offset = HEADER_LEN as u32;
        }
        let header = Self {
            pixel_data_offset,
            width,
            height,
            top_down: raw_height < 0,
            bits_per_pixel,
            image_size,
        };
        let overflow =
            || AssetError::format(label, format!("dimensions overflow ({width}x{height})"));
        let stride = header.row_stride().ok_or_else(overflow)?;
        if image_size == 0 {
            image_size = stride.checked_mul(height).ok_or_else(overflow)?;
        }
        if pixel_data_offset.checked_add(image_size).is_none() {
            return Err(AssetError::format(
                label,
                format!("pixel data {pixel_data_offset}+{image_size} overflows"),
            ));
        }

        Ok(Self {
            image_size,
            ..header
        })
    }

    /// Bytes per stored row, padded to a 4-byte boundary. `None` if it does not fit `u32`.
    pub fn row_stride(&self) -> Option<u32> {
        let bits = u64::from(self.width) * u64::from(self.bits_per_pixel);
        u32::try_from(bits.div_ceil(32) * 4).ok()
    }

    /// Byte range of the pixel array inside the file.
    pub fn pixel_range(&self) -> std::ops::Range<usize> {
        let start = self.pixel_data_offset as usize;
        start..start.saturating_add(self.image_size as usize)
    }
}

fn read_u16(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn read_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn read_i32(b: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

/// Hand-built 24-bit BMP used by tests in this crate.
#[cfg(test)]
pub(crate) fn encode_bgr24(width: u32, height: u32, pixel: [u8; 3]) -> Vec<u8> {
    let stride = (width * 24).div_ceil(32) * 4;
    let image_size = stride * height;
    let file_size = HEADER_LEN as u32 + image_size;

    let mut out = Vec::with_capacity(file_size as usize);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&(HEADER_LEN as u32).to_le_bytes());
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&image_size.to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    debug_assert_eq!(out.len(), HEADER_LEN);

    for _ in 0..height {
        for _ in 0..width {
            out.extend_from_slice(&pixel);
        }
        out.resize(out.len() + (stride - width * 3) as usize, 0);
    }
    out
}
