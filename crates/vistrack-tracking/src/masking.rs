use vistrack_image::{Frame, GrayImage, ImageError, ImageSize};
use vistrack_imgproc::{core::replace_masked, draw::draw_filled_circle, schedule::CooperativeYield};

use crate::{
    config::MaskConfig,
    feature::{FeaturePoint, FlowVector},
    tracker::OpticalFlowTracker,
};

/// Value of a masked pixel.
pub const MASK_ON: u8 = 255;

/// Build a binary mask with a disc around every moving feature.
///
/// # Arguments
///
/// * `size` - The size of the mask.
/// * `features` - The features.
/// * `flows` - The flows, index-aligned with `features`.
/// * `radius` - The disc radius.
/// * `threshold` - Only flows with a magnitude strictly above this are painted.
///
/// # Errors
///
/// Returns [`ImageError::OutOfMemory`] if the mask cannot be allocated.
pub fn build_motion_mask(
    size: ImageSize,
    features: &[FeaturePoint],
    flows: &[FlowVector],
    radius: usize,
    threshold: f32,
) -> Result<GrayImage, ImageError> {
    let mut mask = GrayImage::from_size_val(size, 0)?;

    for (feature, flow) in features.iter().zip(flows.iter()) {
        if !(feature.valid && flow.tracked) || flow.error <= threshold {
            continue;
        }
        draw_filled_circle(&mut mask, (feature.x, feature.y), radius as f32, [MASK_ON]);
    }

    Ok(mask)
}

/// Paints the regions around moving features into the frame.
#[derive(Debug, Default, Clone)]
pub struct MotionMasker {
    config: MaskConfig,
}

impl MotionMasker {
    /// Create a masker with the given parameters.
    pub fn new(config: MaskConfig) -> Self {
        Self { config }
    }

    /// The masker parameters.
    pub fn config(&self) -> &MaskConfig {
        &self.config
    }

    /// Build the motion mask of the tracker's last update.
    ///
    /// The mask is all zero for an uninitialized tracker.
    pub fn build_mask(&self, tracker: &OpticalFlowTracker) -> Result<GrayImage, ImageError> {
        let (features, flows) = if tracker.is_initialized() {
            (tracker.features(), tracker.flows())
        } else {
            (&[][..], &[][..])
        };
        build_motion_mask(
            tracker.size(),
            features,
            flows,
            self.config.radius,
            self.config.magnitude_threshold,
        )
    }

    /// Overwrite every RGB565 frame pixel where the mask is set with `color`.
    ///
    /// Returns the number of pixels written.
    pub fn composite<Y: CooperativeYield + ?Sized>(
        &self,
        frame: &mut Frame,
        mask: &GrayImage,
        color: u16,
        yielder: &mut Y,
    ) -> Result<usize, ImageError> {
        let image = frame.as_rgb565_mut()?;
        replace_masked(image, mask, [color], self.config.yield_every_rows, yielder)
    }

    /// Build the mask for `tracker` and composite it into `frame` with the configured color.
    ///
    /// The mask lives only for the duration of the call.
    pub fn apply<Y: CooperativeYield + ?Sized>(
        &self,
        frame: &mut Frame,
        tracker: &OpticalFlowTracker,
        yielder: &mut Y,
    ) -> Result<usize, ImageError> {
        let mask = self.build_mask(tracker)?;
        let replaced = self.composite(frame, &mask, self.config.color, yielder)?;
        if replaced > 0 {
            log::debug!("replaced {replaced} moving pixels");
        }
        Ok(replaced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::error::TrackerError;
    use vistrack_imgproc::schedule::NoYield;

    fn feature(x: f32, y: f32) -> FeaturePoint {
        FeaturePoint {
            x,
            y,
            valid: true,
            response: 1.0,
        }
    }

    #[test]
    fn disc_around_moving_feature() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 80,
            height: 60,
        };
        let features = [feature(30.0, 25.0), feature(60.0, 40.0)];
        let flows = [FlowVector::tracked(3.0, 0.0), FlowVector::tracked(1.0, 1.0)];
        let mask = build_motion_mask(size, &features, &flows, 15, 2.0)?;

        for y in 0..size.height {
            for x in 0..size.width {
                let (dx, dy) = (x as i64 - 30, y as i64 - 25);
                let expected = if dx * dx + dy * dy <= 225 { MASK_ON } else { 0 };
                assert_eq!(mask.get_pixel(x, y, 0)?, &expected, "at ({x}, {y})");
            }
        }
        Ok(())
    }

    #[test]
    fn disc_around_subpixel_feature() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 80,
            height: 60,
        };
        let (fx, fy) = (30.4f32, 25.0f32);
        let features = [feature(fx, fy)];
        let flows = [FlowVector::tracked(3.0, 0.0)];
        let mask = build_motion_mask(size, &features, &flows, 15, 2.0)?;

        for y in 0..size.height {
            for x in 0..size.width {
                let (dx, dy) = (x as f32 - fx, y as f32 - fy);
                let expected = if dx * dx + dy * dy <= 225.0 { MASK_ON } else { 0 };
                assert_eq!(mask.get_pixel(x, y, 0)?, &expected, "at ({x}, {y})");
            }
        }
        // 15.4 px from the feature
        assert_eq!(mask.get_pixel(15, 25, 0)?, &0);
        assert_eq!(mask.get_pixel(45, 25, 0)?, &MASK_ON);
        Ok(())
    }

    #[test]
    fn skips_invalid_and_untracked() -> Result<(), ImageError> {
        let mut invalid = feature(20.0, 20.0);
        invalid.valid = false;
        let features = [invalid, feature(40.0, 20.0)];
        let flows = [FlowVector::tracked(5.0, 5.0), FlowVector::UNTRACKED];
        let mask = build_motion_mask([60, 40].into(), &features, &flows, 15, 2.0)?;
        assert!(mask.as_slice().iter().all(|&v| v == 0));
        Ok(())
    }

    #[test]
    fn disc_clipped_at_border() -> Result<(), ImageError> {
        let features = [feature(0.0, 0.0)];
        let flows = [FlowVector::tracked(0.0, 4.0)];
        let mask = build_motion_mask([20, 20].into(), &features, &flows, 3, 2.0)?;
        let on = mask.as_slice().iter().filter(|&&v| v == MASK_ON).count();
        // quarter disc of radius 3 including the axes
        assert_eq!(on, 11);
        Ok(())
    }

    #[test]
    fn composite_twice_is_stable() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 40,
            height: 30,
        };
        let mut frame = Frame::rgb565(size, (0..size.area()).map(|i| i as u16).collect())?;
        let features = [feature(20.0, 15.0)];
        let flows = [FlowVector::tracked(4.0, 0.0)];
        let mask = build_motion_mask(size, &features, &flows, 5, 2.0)?;

        let masker = MotionMasker::default();
        let first = masker.composite(&mut frame, &mask, 0xFFFF, &mut NoYield)?;
        let once = frame.clone();
        let second = masker.composite(&mut frame, &mask, 0xFFFF, &mut NoYield)?;

        assert_eq!(first, second);
        assert_eq!(frame, once);
        assert_eq!(frame.as_rgb565()?.get_pixel(20, 15, 0)?, &0xFFFF);
        assert_eq!(frame.as_rgb565()?.get_pixel(0, 0, 0)?, &0);
        Ok(())
    }

    #[test]
    fn uninitialized_tracker_mask_is_empty() -> Result<(), TrackerError> {
        let tracker = OpticalFlowTracker::new([32, 24].into(), TrackerConfig::default())?;
        let mask = MotionMasker::default().build_mask(&tracker)?;
        assert_eq!(mask.size(), tracker.size());
        assert!(mask.as_slice().iter().all(|&v| v == 0));
        Ok(())
    }
}
