#![allow(dead_code)]

use vistrack_image::{Frame, ImageError, ImageSize};
use vistrack_imgproc::color::rgb565_from_rgb;

pub const SIZE: ImageSize = ImageSize {
    width: 160,
    height: 120,
};

/// A smooth texture with corners everywhere, moved `shift` pixels to the right.
pub fn texture(size: ImageSize, shift: f32) -> Vec<u8> {
    let mut data = Vec::with_capacity(size.area());
    for y in 0..size.height {
        for x in 0..size.width {
            let (xx, y) = (x as f32 - shift, y as f32);
            let v = 128.0 + 70.0 * (xx / 8.0).sin() * (y / 8.0).sin() + 35.0 * ((xx + y) / 10.4).sin();
            data.push(v.round() as u8);
        }
    }
    data
}

pub fn gray_frame(shift: f32) -> Result<Frame, ImageError> {
    Frame::gray8(SIZE, texture(SIZE, shift))
}

pub fn rgb565_frame(shift: f32) -> Result<Frame, ImageError> {
    let data = texture(SIZE, shift)
        .into_iter()
        .map(|v| rgb565_from_rgb([v, v, v]))
        .collect();
    Frame::rgb565(SIZE, data)
}
