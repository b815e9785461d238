//! Camera frames as delivered by an image sensor.
//!
//! A sensor hands out frames in whatever encoding it was configured for, so the
//! encoding is only known at runtime. [`Frame`] carries the typed pixel plane for
//! each supported encoding and the accessors report
//! [`ImageError::UnsupportedFormat`] when an operation needs a different one.

use crate::{
    error::ImageError,
    image::{GrayImage, ImageSize, Rgb565Image},
};

/// Supported frame pixel encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Packed 16-bit color: 5 bits red, 6 bits green, 5 bits blue (high to low).
    Rgb565,
    /// Single channel 8-bit intensity.
    Gray8,
}

impl PixelFormat {
    /// Get the bytes per pixel of the encoding.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgb565 => 2,
            Self::Gray8 => 1,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rgb565 => write!(f, "RGB565"),
            Self::Gray8 => write!(f, "GRAY8"),
        }
    }
}

/// A frame of pixels with a runtime encoding.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    /// A packed 5-6-5 color frame.
    Rgb565(Rgb565Image),
    /// An 8-bit grayscale frame.
    Gray8(GrayImage),
}

impl Frame {
    /// Create a color frame from packed 5-6-5 samples.
    ///
    /// # Examples
    ///
    /// ```
    /// use vistrack_image::{Frame, ImageSize, PixelFormat};
    ///
    /// let frame = Frame::rgb565(ImageSize { width: 4, height: 2 }, vec![0xFFFF; 8]).unwrap();
    /// assert_eq!(frame.format(), PixelFormat::Rgb565);
    /// ```
    pub fn rgb565(size: ImageSize, data: Vec<u16>) -> Result<Self, ImageError> {
        Ok(Self::Rgb565(Rgb565Image::new(size, data)?))
    }

    /// Create a grayscale frame from 8-bit samples.
    pub fn gray8(size: ImageSize, data: Vec<u8>) -> Result<Self, ImageError> {
        Ok(Self::Gray8(GrayImage::new(size, data)?))
    }

    /// Create a color frame from raw sensor bytes, two big-endian bytes per pixel.
    pub fn rgb565_from_be_bytes(size: ImageSize, bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.len() != size.area() * PixelFormat::Rgb565.bytes_per_pixel() {
            return Err(ImageError::InvalidChannelShape(
                bytes.len(),
                size.area() * PixelFormat::Rgb565.bytes_per_pixel(),
            ));
        }
        let data = bytes
            .chunks_exact(2)
            .map(|px| u16::from_be_bytes([px[0], px[1]]))
            .collect();
        Self::rgb565(size, data)
    }

    /// Get the pixel encoding of the frame.
    pub fn format(&self) -> PixelFormat {
        match self {
            Self::Rgb565(_) => PixelFormat::Rgb565,
            Self::Gray8(_) => PixelFormat::Gray8,
        }
    }

    /// Get the size of the frame in pixels.
    pub fn size(&self) -> ImageSize {
        match self {
            Self::Rgb565(img) => img.size(),
            Self::Gray8(img) => img.size(),
        }
    }

    /// Get the width of the frame in pixels.
    pub fn width(&self) -> usize {
        self.size().width
    }

    /// Get the height of the frame in pixels.
    pub fn height(&self) -> usize {
        self.size().height
    }

    /// Borrow the color plane, failing if the frame is not RGB565.
    pub fn as_rgb565(&self) -> Result<&Rgb565Image, ImageError> {
        match self {
            Self::Rgb565(img) => Ok(img),
            other => Err(ImageError::UnsupportedFormat {
                expected: PixelFormat::Rgb565,
                found: other.format(),
            }),
        }
    }

    /// Mutably borrow the color plane, failing if the frame is not RGB565.
    pub fn as_rgb565_mut(&mut self) -> Result<&mut Rgb565Image, ImageError> {
        match self {
            Self::Rgb565(img) => Ok(img),
            other => Err(ImageError::UnsupportedFormat {
                expected: PixelFormat::Rgb565,
                found: other.format(),
            }),
        }
    }

    /// Borrow the grayscale plane, failing if the frame is not GRAY8.
    pub fn as_gray8(&self) -> Result<&GrayImage, ImageError> {
        match self {
            Self::Gray8(img) => Ok(img),
            other => Err(ImageError::UnsupportedFormat {
                expected: PixelFormat::Gray8,
                found: other.format(),
            }),
        }
    }
}
