use vistrack_image::{GrayImage, ImageError};
use vistrack_imgproc::gradient::central_difference;

use crate::feature::{FeatureTable, FlowVector};

/// Systems whose determinant is below this in magnitude are not solved.
const MIN_DETERMINANT: f32 = 1e-6;

/// Solve the Lucas-Kanade flow of a single point between two frames.
///
/// The spatial gradients come from `prev` by central differences and the
/// temporal derivative is `curr - prev`, both accumulated over a square
/// window of side `window_size` centered on the rounded point. The 2x2
/// system is solved in closed form, without iterations or pyramid levels.
///
/// # Arguments
///
/// * `prev` - The previous grayscale frame.
/// * `curr` - The current grayscale frame.
/// * `point` - The position of the point in `prev`.
/// * `window_size` - The side of the window, odd.
///
/// # Returns
///
/// The flow of the point. It is untracked when the rounded point lies within
/// `window_size` pixels of an edge or when the system is singular.
pub fn solve_flow(
    prev: &GrayImage,
    curr: &GrayImage,
    point: (f32, f32),
    window_size: usize,
) -> Result<FlowVector, ImageError> {
    if prev.size() != curr.size() {
        return Err(ImageError::InvalidImageSize(
            prev.cols(),
            prev.rows(),
            curr.cols(),
            curr.rows(),
        ));
    }

    let cols = prev.cols() as i64;
    let rows = prev.rows() as i64;
    let win = window_size as i64;
    let half = win / 2;

    let fx = point.0.round() as i64;
    let fy = point.1.round() as i64;
    if fx < win || fx >= cols - win || fy < win || fy >= rows - win {
        return Ok(FlowVector::UNTRACKED);
    }

    let p = prev.as_slice();
    let c = curr.as_slice();

    let (mut a11, mut a12, mut a22) = (0.0f32, 0.0f32, 0.0f32);
    let (mut b1, mut b2) = (0.0f32, 0.0f32);

    for y in fy - half..=fy + half {
        for x in fx - half..=fx + half {
            if x < 1 || x >= cols - 1 || y < 1 || y >= rows - 1 {
                continue;
            }
            let idx = (y * cols + x) as usize;
            let stride = cols as usize;

            let ix = central_difference(p[idx - 1], p[idx + 1]);
            let iy = central_difference(p[idx - stride], p[idx + stride]);
            let it = c[idx] as f32 - p[idx] as f32;

            a11 += ix * ix;
            a12 += ix * iy;
            a22 += iy * iy;
            b1 -= ix * it;
            b2 -= iy * it;
        }
    }

    let det = a11 * a22 - a12 * a12;
    if det.abs() < MIN_DETERMINANT {
        return Ok(FlowVector::UNTRACKED);
    }

    let dx = (a22 * b1 - a12 * b2) / det;
    let dy = (a11 * b2 - a12 * b1) / det;

    Ok(FlowVector::tracked(dx, dy))
}

/// Solve the flow of every feature in the table, in place.
///
/// Invalid features get an untracked flow.
pub fn solve_table(
    prev: &GrayImage,
    curr: &GrayImage,
    table: &mut FeatureTable,
    window_size: usize,
) -> Result<(), ImageError> {
    for (feature, flow) in table.entries_mut() {
        *flow = if feature.valid {
            solve_flow(prev, curr, (feature.x, feature.y), window_size)?
        } else {
            FlowVector::UNTRACKED
        };
    }
    Ok(())
}
