use serde::{Deserialize, Serialize};
use vistrack_image::{Frame, ImageError};

use crate::{
    color::rgb_from_rgb565,
    draw::{draw_cross, draw_rect},
    schedule::{yield_on_row, CooperativeYield},
    threshold::ColorThreshold,
};

/// Thickness of the border drawn around a detected blob.
const BLOB_BORDER_THICKNESS: usize = 3;
/// Arm length of the centroid marker.
const BLOB_MARKER_ARM: i64 = 4;

/// The region of matching pixels found by [`ColorSegmenter::detect`].
///
/// All fields are zero unless `found` is set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// Whether enough pixels matched.
    pub found: bool,
    /// Centroid column.
    pub x: usize,
    /// Centroid row.
    pub y: usize,
    /// Width of the bounding box.
    pub width: usize,
    /// Height of the bounding box.
    pub height: usize,
    /// Number of matching pixels.
    pub area: usize,
}

/// Shape gate applied to a found blob before acting on it.
///
/// All bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobFilter {
    /// The area must be strictly above this.
    pub min_area: usize,
    /// The area must be strictly below this.
    pub max_area: usize,
    /// The box width must be strictly above this.
    pub min_width: usize,
    /// The box height must be strictly above this.
    pub min_height: usize,
}

impl Default for BlobFilter {
    fn default() -> Self {
        Self {
            min_area: 50,
            max_area: 5000,
            min_width: 10,
            min_height: 10,
        }
    }
}

impl BlobFilter {
    /// Whether `blob` is found and passes every bound.
    pub fn accepts(&self, blob: &Blob) -> bool {
        blob.found
            && blob.area > self.min_area
            && blob.area < self.max_area
            && blob.width > self.min_width
            && blob.height > self.min_height
    }
}

/// Parameters of the color segmenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// A blob is found only if strictly more pixels than this match.
    pub min_pixel_count: usize,
    /// Yield after every row divisible by this value. Zero disables yielding.
    pub yield_every_rows: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_pixel_count: 100,
            yield_every_rows: 10,
        }
    }
}

/// Locates the single region of pixels inside a [`ColorThreshold`].
#[derive(Debug, Default, Clone)]
pub struct ColorSegmenter {
    config: SegmenterConfig,
}

impl ColorSegmenter {
    /// Create a segmenter with the given parameters.
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// The segmenter parameters.
    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Scan an RGB565 frame for pixels inside `threshold`.
    ///
    /// The scan makes a single pass and allocates nothing. The centroid is
    /// the integer mean of the matching coordinates and the box spans the
    /// extreme matching coordinates.
    ///
    /// # Arguments
    ///
    /// * `frame` - The frame to scan. Must be RGB565.
    /// * `threshold` - The color box.
    /// * `yielder` - The cooperative yield hook.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::UnsupportedFormat`] for non RGB565 frames.
    pub fn detect<Y: CooperativeYield + ?Sized>(
        &self,
        frame: &Frame,
        threshold: &ColorThreshold,
        yielder: &mut Y,
    ) -> Result<Blob, ImageError> {
        let image = frame.as_rgb565()?;
        let cols = image.cols();
        let rows = image.rows();

        let (mut min_x, mut max_x) = (cols, 0);
        let (mut min_y, mut max_y) = (rows, 0);
        let (mut count, mut sum_x, mut sum_y) = (0usize, 0usize, 0usize);

        for (y, row) in image.as_slice().chunks_exact(cols).enumerate() {
            for (x, &sample) in row.iter().enumerate() {
                if threshold.contains(rgb_from_rgb565(sample)) {
                    count += 1;
                    sum_x += x;
                    sum_y += y;
                    min_x = min_x.min(x);
                    max_x = max_x.max(x);
                    min_y = min_y.min(y);
                    max_y = max_y.max(y);
                }
            }
            yield_on_row(y, self.config.yield_every_rows, yielder);
        }

        if count <= self.config.min_pixel_count {
            log::debug!("blob not found: {count} matching pixels");
            return Ok(Blob::default());
        }

        Ok(Blob {
            found: true,
            x: sum_x / count,
            y: sum_y / count,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
            area: count,
        })
    }

    /// Detect a blob and, if found, draw its box and centroid marker into the frame.
    ///
    /// The box has the blob's size and is centered on the centroid. The
    /// returned blob is the one detected before drawing.
    pub fn detect_and_draw<Y: CooperativeYield + ?Sized>(
        &self,
        frame: &mut Frame,
        threshold: &ColorThreshold,
        color: u16,
        yielder: &mut Y,
    ) -> Result<Blob, ImageError> {
        let blob = self.detect(frame, threshold, yielder)?;
        if blob.found {
            draw_blob(frame, &blob, color)?;
        }
        Ok(blob)
    }
}

/// Draw the centered box and the centroid marker of `blob` into an RGB565 frame.
pub fn draw_blob(frame: &mut Frame, blob: &Blob, color: u16) -> Result<(), ImageError> {
    let image = frame.as_rgb565_mut()?;

    let (cx, cy) = (blob.x as i64, blob.y as i64);
    let top_left = (cx - blob.width as i64 / 2, cy - blob.height as i64 / 2);
    draw_rect(
        image,
        top_left,
        (blob.width, blob.height),
        [color],
        BLOB_BORDER_THICKNESS,
    );
    draw_cross(image, (cx, cy), BLOB_MARKER_ARM, [color]);

    log::debug!(
        "drew blob at ({}, {}) size {}x{} color {:#06x}",
        top_left.0,
        top_left.1,
        blob.width,
        blob.height,
        color
    );

    Ok(())
}
