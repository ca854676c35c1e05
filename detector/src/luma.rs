use image::{GrayImage, ImageError, ImageReader};
use std::io::Cursor;

use crate::error::DecodeError;

/// Decoded single-channel 8-bit intensity grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaGrid(GrayImage);

impl LumaGrid {
    /// Build a grid from row-major pixels. Returns `None` if the buffer length
    /// does not match `width * height`.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        GrayImage::from_raw(width, height, pixels).map(Self)
    }

    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> Self {
        Self(GrayImage::from_fn(width, height, |x, y| image::Luma([f(x, y)])))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn pixel_count(&self) -> usize {
        self.0.as_raw().len()
    }

    /// Row-major pixel values.
    pub fn pixels(&self) -> &[u8] {
        self.0.as_raw()
    }
}

/// Decode a compressed image and convert it to luma.
///
/// The container format is sniffed from the bytes. Color images go through
/// `to_luma8`, so current and reference frames always use the same weighting.
pub fn decode(data: &[u8]) -> Result<LumaGrid, DecodeError> {
    if data.is_empty() {
        return Err(DecodeError::Empty);
    }
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(ImageError::IoError)?
        .decode()?;
    Ok(LumaGrid(img.to_luma8()))
}
