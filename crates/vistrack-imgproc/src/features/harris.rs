use serde::{Deserialize, Serialize};
use vistrack_image::{GrayImage, ImageError};

use crate::gradient::GradientField;

/// Pixels closer than this to any edge have a zero response.
const RESPONSE_MARGIN: usize = 2;

/// Parameters of the grid Harris detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CornerConfig {
    /// Harris sensitivity factor.
    pub k: f32,
    /// A candidate becomes a corner only if its response is strictly above this.
    pub min_response: f32,
    /// Distance in pixels between grid candidates.
    pub grid_stride: usize,
    /// Distance in pixels between the grid and every image edge.
    pub grid_margin: usize,
}

impl Default for CornerConfig {
    fn default() -> Self {
        Self {
            k: 0.04,
            min_response: 0.01,
            grid_stride: 8,
            grid_margin: 10,
        }
    }
}

/// A detected corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    /// Column of the corner.
    pub x: usize,
    /// Row of the corner.
    pub y: usize,
    /// Harris response at the corner.
    pub response: f32,
}

/// Compute the Harris response at `(x, y)` over a 3x3 neighbourhood of the gradient field.
///
/// With `A = sum(gx^2)`, `B = sum(gx*gy)` and `C = sum(gy^2)` the response is
/// `A*C - B^2 - k*(A + C)^2`. Points within 2 pixels of an edge return zero.
pub fn harris_response(field: &GradientField, x: usize, y: usize, k: f32) -> f32 {
    let size = field.size();
    if x < RESPONSE_MARGIN
        || y < RESPONSE_MARGIN
        || x + RESPONSE_MARGIN >= size.width
        || y + RESPONSE_MARGIN >= size.height
    {
        return 0.0;
    }

    let cols = size.width;
    let gx = field.gx().as_slice();
    let gy = field.gy().as_slice();

    let (mut a, mut b, mut c) = (0.0f32, 0.0f32, 0.0f32);
    for wy in y - 1..=y + 1 {
        for wx in x - 1..=x + 1 {
            let idx = wy * cols + wx;
            let (ix, iy) = (gx[idx], gy[idx]);
            a += ix * ix;
            b += ix * iy;
            c += iy * iy;
        }
    }

    let det = a * c - b * b;
    let trace = a + c;
    det - k * trace * trace
}

/// Detect up to `max_corners` Harris corners on the candidate grid.
///
/// # Arguments
///
/// * `src` - The grayscale image.
/// * `config` - The detector parameters.
/// * `max_corners` - The maximum number of corners to return.
///
/// # Returns
///
/// The corners in row-major grid order. The scan stops as soon as
/// `max_corners` have been found.
///
/// # Errors
///
/// Returns [`ImageError::InvalidArgument`] for a zero grid stride and
/// [`ImageError::OutOfMemory`] if the gradient buffers cannot be allocated.
pub fn detect_corners(
    src: &GrayImage,
    config: &CornerConfig,
    max_corners: usize,
) -> Result<Vec<Corner>, ImageError> {
    if config.grid_stride == 0 {
        return Err(ImageError::InvalidArgument(
            "grid stride must be greater than zero".to_string(),
        ));
    }
    let field = GradientField::from_image(src)?;
    detect_corners_in_field(&field, config, max_corners)
}

/// Same as [`detect_corners`] on an already computed gradient field.
pub fn detect_corners_in_field(
    field: &GradientField,
    config: &CornerConfig,
    max_corners: usize,
) -> Result<Vec<Corner>, ImageError> {
    if config.grid_stride == 0 {
        return Err(ImageError::InvalidArgument(
            "grid stride must be greater than zero".to_string(),
        ));
    }

    let size = field.size();
    let margin = config.grid_margin;
    let x_end = size.width.saturating_sub(margin);
    let y_end = size.height.saturating_sub(margin);

    let mut corners = Vec::with_capacity(max_corners);
    if max_corners == 0 {
        return Ok(corners);
    }

    'grid: for y in (margin..y_end).step_by(config.grid_stride) {
        for x in (margin..x_end).step_by(config.grid_stride) {
            let response = harris_response(field, x, y, config.k);
            if response > config.min_response {
                corners.push(Corner { x, y, response });
                if corners.len() >= max_corners {
                    break 'grid;
                }
            }
        }
    }

    log::debug!("detected {} corners on a {} grid", corners.len(), size);

    Ok(corners)
}
