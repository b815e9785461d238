#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// fallible buffer allocation helpers.
pub mod allocator;

/// Error types for the image module.
pub mod error;

/// camera frame representation with a runtime pixel encoding.
pub mod frame;

/// image representation for computer vision purposes.
pub mod image;

pub use crate::error::ImageError;
pub use crate::frame::{Frame, PixelFormat};
pub use crate::image::{GrayImage, Image, ImageSize, Rgb565Image};
