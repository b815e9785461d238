use vistrack_image::{GrayImage, Image, ImageError, ImageSize};

/// Horizontal and vertical central-difference derivatives of a grayscale image.
///
/// Only interior pixels carry a derivative, the 1-pixel border is zero.
#[derive(Debug, Clone)]
pub struct GradientField {
    gx: Image<f32, 1>,
    gy: Image<f32, 1>,
}

impl GradientField {
    /// Allocate a zeroed gradient field for images of `size`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::OutOfMemory`] if either buffer cannot be allocated.
    pub fn new(size: ImageSize) -> Result<Self, ImageError> {
        Ok(Self {
            gx: Image::from_size_val(size, 0.0)?,
            gy: Image::from_size_val(size, 0.0)?,
        })
    }

    /// Allocate a gradient field and compute it from `src`.
    pub fn from_image(src: &GrayImage) -> Result<Self, ImageError> {
        let mut field = Self::new(src.size())?;
        field.compute(src)?;
        Ok(field)
    }

    /// Recompute the derivatives from `src`, reusing the existing buffers.
    ///
    /// # Arguments
    ///
    /// * `src` - The grayscale image. Must match the size of the field.
    pub fn compute(&mut self, src: &GrayImage) -> Result<(), ImageError> {
        if src.size() != self.gx.size() {
            return Err(ImageError::InvalidImageSize(
                src.cols(),
                src.rows(),
                self.gx.cols(),
                self.gx.rows(),
            ));
        }

        let cols = src.cols();
        let rows = src.rows();
        let data = src.as_slice();
        let gx = self.gx.as_slice_mut();
        let gy = self.gy.as_slice_mut();

        gx.fill(0.0);
        gy.fill(0.0);

        if cols < 3 || rows < 3 {
            return Ok(());
        }

        for y in 1..rows - 1 {
            let row = y * cols;
            for x in 1..cols - 1 {
                let idx = row + x;
                gx[idx] = central_difference(data[idx - 1], data[idx + 1]);
                gy[idx] = central_difference(data[idx - cols], data[idx + cols]);
            }
        }

        Ok(())
    }

    /// The size of the field.
    pub fn size(&self) -> ImageSize {
        self.gx.size()
    }

    /// The horizontal derivative.
    pub fn gx(&self) -> &Image<f32, 1> {
        &self.gx
    }

    /// The vertical derivative.
    pub fn gy(&self) -> &Image<f32, 1> {
        &self.gy
    }

    /// Both derivatives at pixel `(x, y)`, or `None` if out of bounds.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> Option<(f32, f32)> {
        if x >= self.gx.cols() || y >= self.gx.rows() {
            return None;
        }
        let idx = y * self.gx.cols() + x;
        Some((self.gx.as_slice()[idx], self.gy.as_slice()[idx]))
    }
}

/// Half the difference between the following and the preceding sample.
#[inline]
pub fn central_difference(prev: u8, next: u8) -> f32 {
    (next as f32 - prev as f32) / 2.0
}
