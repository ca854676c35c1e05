use image::{GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use std::io::Cursor;

use frame_gate_common::frame::CompressedFrame;

/// Lossless grayscale frame, so decoded pixels equal `f(x, y)` exactly.
pub fn gray_png(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> CompressedFrame {
    let img = GrayImage::from_fn(width, height, |x, y| Luma([f(x, y)]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    CompressedFrame::from(buf.into_inner())
}

/// Solid-color JPEG.
pub fn rgb_jpeg(width: u32, height: u32, color: [u8; 3]) -> CompressedFrame {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    CompressedFrame::from(buf.into_inner())
}

/// 10x10 frame whose first `lit` pixels (row-major) are 255 and the rest 0.
pub fn lit_pixels(lit: u32) -> CompressedFrame {
    gray_png(10, 10, move |x, y| if y * 10 + x < lit { 255 } else { 0 })
}
